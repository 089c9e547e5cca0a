//! Windowed loader/unloader: spec §4.7's C7, bridging the persistence
//! backend and the in-memory caches.
//!
//! This crate provides [`Loader`], which tracks how much of each branch's
//! history is currently resident and streams rows in or drops them as that
//! window moves.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod loader;

pub use loader::Loader;
