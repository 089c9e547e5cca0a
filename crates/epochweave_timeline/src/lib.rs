//! Branch tree, time cursor, and the forward/planning/batch mode guards.
//!
//! This crate provides:
//! - [`WindowDict`] - ordered `(Turn, Tick) -> V` map with "at or before"
//!   retrieval and windowed iteration (spec §4's C1)
//! - [`BranchId`]/[`BranchInfo`] - the branch tree (spec §3's `Timeline`)
//! - [`Timeline`] - the process-wide cursor plus `_nbtt` write bookkeeping
//!   (spec §4.1/§4.2's C2)
//! - [`guards`] - RAII scope guards for forward/planning/batch mode

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod branch;
pub mod cursor;
pub mod guards;
pub mod window;

pub use branch::{BranchId, BranchInfo, TRUNK};
pub use cursor::{NbttOutcome, ParentBttIter, Time, Timeline};
pub use guards::{BatchGuard, ForwardGuard, PlanningGuard};
pub use window::{Tick, Turn, WindowDict};
