//! Store capability traits.
//!
//! The reconciler only talks to the remote side through these traits, so
//! tests can swap in mocks.

use async_trait::async_trait;

use crate::error::Result;
use crate::variables::Variable;

/// Workspace variable store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// Lists the variables defined directly on a workspace.
    async fn list(&self, workspace_id: &str) -> Result<Vec<Variable>>;

    /// Creates a variable and returns it with its assigned id.
    async fn create(&self, workspace_id: &str, variable: &Variable) -> Result<Variable>;

    /// Replaces the variable `id` with `variable`.
    async fn update(&self, workspace_id: &str, id: &str, variable: &Variable) -> Result<Variable>;

    /// Deletes the variable `id`.
    async fn delete(&self, workspace_id: &str, id: &str) -> Result<()>;
}

/// Read-only access to variable sets shared with a workspace.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VariableSetStore: Send + Sync {
    /// Lists the ids of the variable sets applied to a workspace.
    async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<String>>;

    /// Lists the variables of one variable set.
    async fn list_variables(&self, set_id: &str) -> Result<Vec<Variable>>;
}
