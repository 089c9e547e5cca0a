//! Public ORM facade: spec §4.8/§5's C8, the re-entrant-locked entry point
//! tying every other crate together.
//!
//! This crate provides:
//! - [`Orm`] - the facade: `new_graph`/`del_graph`, per-family attribute
//!   accessors, cursor control, the mode guards, and persistence lifecycle
//! - [`GraphHandle`] - a capability view scoped to one graph
//! - [`TimeChange`] - the six-tuple the time signal fires with
//! - [`CacheArranger`] - an optional background prefetch worker

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arranger;
pub mod guards;
pub mod handle;
pub mod orm;
mod state;

pub use arranger::{ArrangeRequest, CacheArranger};
pub use guards::{AdvancingGuard, BatchGuard, PlanGuard};
pub use handle::{AttrView, GraphHandle};
pub use orm::Orm;
pub use state::TimeChange;
