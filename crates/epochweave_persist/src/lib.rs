//! Persistence backend interface: spec §4.9/§6's C9.
//!
//! This crate provides:
//! - [`Backend`] - the storage-agnostic trait every persistence adapter
//!   implements
//! - row types passed across that boundary, mirroring the shape of the rows
//!   a SQL-backed adapter would actually store
//! - [`MemoryBackend`] - an in-memory reference implementation, useful for
//!   tests and as the default backend when nothing durable is configured

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backend;
pub mod memory;
pub mod rows;

pub use backend::Backend;
pub use memory::MemoryBackend;
pub use rows::{
    BranchRow, EdgeRow, EdgeValRow, GraphRow, GraphValRow, KeyframeRow, NodeRow, NodeValRow,
    PlanRow, PlanTickRow, TurnRow,
};
