//! Workspace discovery from an initialized Terraform working directory.
//!
//! `terraform init` with a `remote` backend or a `cloud` block records the
//! organization and workspace in `.terraform/terraform.tfstate`. Prefixed
//! workspaces are completed with the selected workspace from
//! `.terraform/environment`.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

/// Workspace selected by the local backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendWorkspace {
    /// Organization name.
    pub organization: String,
    /// Workspace name.
    pub workspace: String,
}

#[derive(Debug, Deserialize)]
struct BackendState {
    backend: Option<Backend>,
}

#[derive(Debug, Deserialize)]
struct Backend {
    #[serde(rename = "type")]
    kind: String,
    config: BackendConfig,
}

#[derive(Debug, Deserialize)]
struct BackendConfig {
    organization: Option<String>,
    workspaces: Option<WorkspacesConfig>,
}

#[derive(Debug, Deserialize)]
struct WorkspacesConfig {
    name: Option<String>,
    prefix: Option<String>,
}

/// Name of the workspace selected when `.terraform/environment` is absent.
const DEFAULT_ENVIRONMENT: &str = "default";

/// Reads the backend workspace of the Terraform directory `dir`.
///
/// Returns `None` when the directory is not initialized with a `remote` or
/// `cloud` backend, or the state does not name a workspace.
#[must_use]
pub fn discover_workspace(dir: &Path) -> Option<BackendWorkspace> {
    let terraform_dir = dir.join(".terraform");
    let state_path = terraform_dir.join("terraform.tfstate");

    let content = match std::fs::read_to_string(&state_path) {
        Ok(content) => content,
        Err(e) => {
            debug!("No backend state at {}: {e}", state_path.display());
            return None;
        }
    };

    let state: BackendState = match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            warn!("Ignoring unreadable backend state {}: {e}", state_path.display());
            return None;
        }
    };

    let backend = state.backend?;
    if backend.kind != "remote" && backend.kind != "cloud" {
        debug!("Backend type '{}' does not name a workspace", backend.kind);
        return None;
    }

    let organization = backend.config.organization?;
    let workspaces = backend.config.workspaces?;

    let workspace = match (workspaces.name, workspaces.prefix) {
        (Some(name), _) if !name.is_empty() => name,
        (_, Some(prefix)) => {
            let environment = std::fs::read_to_string(terraform_dir.join("environment"))
                .map_or_else(|_| String::from(DEFAULT_ENVIRONMENT), |s| s.trim().to_string());
            format!("{prefix}{environment}")
        }
        _ => return None,
    };

    debug!("Discovered workspace {organization}/{workspace} from backend state");
    Some(BackendWorkspace {
        organization,
        workspace,
    })
}
