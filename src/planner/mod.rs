//! Planning module for sync operations.
//!
//! This module compares local and remote variables, renders the difference,
//! and turns it into create/update/delete actions applied to the store.

mod confirm;
mod diff;
mod executor;
mod plan;

pub use confirm::confirm;
pub use diff::{DiffEngine, LineKind};
pub use executor::{PlanExecutor, SyncOutcome, SyncSummary};
pub use plan::{SyncAction, SyncPlan, SyncPlanner};
