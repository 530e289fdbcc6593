//! Plan executor for applying sync plans.
//!
//! Actions run one at a time against the variable store. The first failure
//! stops execution; actions already applied stay applied.

use std::fmt;

use tracing::{error, info};

use crate::error::{Result, SyncError};
use crate::store::VariableStore;

use super::plan::{SyncAction, SyncPlan};

/// Counts of applied actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Variables created.
    pub created: usize,
    /// Variables updated.
    pub updated: usize,
    /// Variables deleted.
    pub deleted: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "create: {}, update: {}, delete: {}",
            self.created, self.updated, self.deleted
        )
    }
}

/// How a mutating command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The plan was empty.
    NoChanges,
    /// The user declined the confirmation prompt.
    Aborted,
    /// The plan was applied.
    Applied(SyncSummary),
}

/// Executor for sync plans.
pub struct PlanExecutor<'a> {
    /// Variable store to mutate.
    store: &'a dyn VariableStore,
    /// Target workspace id.
    workspace_id: &'a str,
}

impl fmt::Debug for PlanExecutor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanExecutor")
            .field("workspace_id", &self.workspace_id)
            .finish_non_exhaustive()
    }
}

impl<'a> PlanExecutor<'a> {
    /// Creates a new plan executor.
    #[must_use]
    pub const fn new(store: &'a dyn VariableStore, workspace_id: &'a str) -> Self {
        Self {
            store,
            workspace_id,
        }
    }

    /// Applies every action of the plan in order.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionFailed`] carrying the counts of the actions
    /// completed before the failing one.
    pub async fn execute(&self, plan: &SyncPlan) -> Result<SyncSummary> {
        info!("Applying {} actions", plan.actions.len());
        let mut summary = SyncSummary::default();

        for action in &plan.actions {
            if let Err(e) = self.apply(action).await {
                error!("Failed to {action}: {e}");
                return Err(SyncError::ActionFailed {
                    action: action.to_string(),
                    completed: summary,
                    reason: e.to_string(),
                }
                .into());
            }

            match action {
                SyncAction::Create { .. } => summary.created += 1,
                SyncAction::Update { .. } => summary.updated += 1,
                SyncAction::Delete { .. } => summary.deleted += 1,
            }
            info!("Applied: {action}");
        }

        info!("{summary}");
        Ok(summary)
    }

    async fn apply(&self, action: &SyncAction) -> Result<()> {
        match action {
            SyncAction::Create { variable } => {
                self.store.create(self.workspace_id, variable).await?;
            }
            SyncAction::Update { id, variable } => {
                self.store.update(self.workspace_id, id, variable).await?;
            }
            SyncAction::Delete { id, .. } => {
                self.store.delete(self.workspace_id, id).await?;
            }
        }
        Ok(())
    }
}
