//! Remote variable store.
//!
//! This module provides:
//! - The [`VariableStore`] and [`VariableSetStore`] capabilities
//! - [`TfcClient`], their Terraform Cloud implementation

mod client;
mod traits;
mod types;

pub use client::TfcClient;
pub use traits::{VariableSetStore, VariableStore};
pub use types::Workspace;

#[cfg(test)]
pub use traits::{MockVariableSetStore, MockVariableStore};
