//! Core atoms, error types, and persistent collections shared across
//! epochweave's temporal graph store.
//!
//! This crate provides:
//! - [`Value`] - the universal atom type for graph/node/edge keys and attribute values
//! - [`Error`] / [`ErrorKind`] - rich error types with context
//! - Persistent collections ([`PVec`], [`PSet`], [`PMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod value;

pub use collections::{PMap, PSet, PVec};
pub use error::{Error, ErrorContext, ErrorKind, Result, Time};
pub use value::Value;
