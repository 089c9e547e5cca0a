//! Plan manager: tentative future writes grouped into plans, contradiction
//! handling, and plan copy across branch forks (spec §4.5's C5).
//!
//! This crate provides:
//! - [`PlanId`] - a strictly increasing plan identifier
//! - [`PlanManager`] - per-branch plan sets, per-plan tick journals, and the
//!   reverse time -> plan index
//! - [`ForkedPlan`] - the result of copying a plan across a branch fork

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod plan;

pub use plan::{ForkedPlan, PlanId, PlanManager};
