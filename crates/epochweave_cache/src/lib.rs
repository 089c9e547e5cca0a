//! Historical cache, keyframe manager, and delta engine: spec §4.3/§4.4/§4.6's
//! C3 + C4 + C6.
//!
//! This crate provides:
//! - [`EntityJournal`] - the per-entity-family forward/backward change journal
//! - [`GraphDelta`] - a nested diff between two times, and its application to
//!   a [`epochweave_storage::GraphState`]
//! - [`KeyframeManager`] - full-snapshot keyframes, de-novo and delta-based
//! - [`GraphCaches`] - the five journals for one graph, tied together with
//!   the recursive retrieval and keyframe-synthesis algorithms

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod delta;
pub mod graph_caches;
pub mod journal;
pub mod keyframe;

pub use delta::GraphDelta;
pub use graph_caches::{GraphCaches, Retrieved};
pub use journal::EntityJournal;
pub use keyframe::KeyframeManager;
