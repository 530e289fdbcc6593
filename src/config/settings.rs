//! Resolved connection settings.
//!
//! Command-line flags and environment variables take precedence; the token
//! falls back to the Terraform CLI credentials file and the workspace to the
//! backend state of the current directory.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ConfigError, Result};

use super::backend::discover_workspace;
use super::credentials::{default_credentials_path, read_token};

/// Default Terraform Cloud hostname.
pub const DEFAULT_HOSTNAME: &str = "app.terraform.io";

/// Connection options as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    /// API token.
    pub token: Option<String>,
    /// API hostname.
    pub hostname: Option<String>,
    /// Organization name.
    pub organization: Option<String>,
    /// Workspace name.
    pub workspace: Option<String>,
}

/// Fully resolved settings for talking to a workspace.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// API token.
    pub token: String,
    /// API hostname.
    pub hostname: String,
    /// Organization name.
    pub organization: String,
    /// Workspace name.
    pub workspace: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("token", &"<redacted>")
            .field("hostname", &self.hostname)
            .field("organization", &self.organization)
            .field("workspace", &self.workspace)
            .finish()
    }
}

/// Where fallback values are looked up.
#[derive(Debug, Clone, Default)]
pub struct Fallbacks {
    /// Terraform working directory holding `.terraform/`.
    pub work_dir: PathBuf,
    /// Credentials file; `None` uses the default location.
    pub credentials_path: Option<PathBuf>,
}

impl Settings {
    /// Resolves settings from options and fallbacks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] if no token is available,
    /// [`ConfigError::MissingWorkspace`] if organization or workspace cannot
    /// be determined, or a credentials error for an unreadable credentials
    /// file.
    pub fn resolve(options: ConnectionOptions, fallbacks: &Fallbacks) -> Result<Self> {
        let hostname = options
            .hostname
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_HOSTNAME));

        let token = match options.token.filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                let path = fallbacks
                    .credentials_path
                    .clone()
                    .or_else(default_credentials_path);
                let token = match path {
                    Some(path) => read_token(&path, &hostname)?,
                    None => None,
                };
                token.ok_or_else(|| ConfigError::MissingToken {
                    hostname: hostname.clone(),
                })?
            }
        };

        let (organization, workspace) = match (options.organization, options.workspace) {
            (Some(organization), Some(workspace)) => (organization, workspace),
            (organization, workspace) => {
                let discovered = discover_workspace(&fallbacks.work_dir);
                let organization = organization
                    .or_else(|| discovered.as_ref().map(|d| d.organization.clone()))
                    .ok_or(ConfigError::MissingWorkspace)?;
                let workspace = workspace
                    .or_else(|| discovered.map(|d| d.workspace))
                    .ok_or(ConfigError::MissingWorkspace)?;
                (organization, workspace)
            }
        };

        info!("Using workspace {organization}/{workspace} on {hostname}");
        Ok(Self {
            token,
            hostname,
            organization,
            workspace,
        })
    }
}

/// Loads a `.env` file from `dir` if present.
///
/// Runs before logging is set up, so the loaded path is returned for the
/// caller to report.
///
/// # Errors
///
/// Returns [`ConfigError::EnvFile`] if the file exists but cannot be loaded.
pub fn load_dotenv(dir: &Path) -> Result<Option<PathBuf>> {
    let env_path = dir.join(".env");
    if !env_path.exists() {
        return Ok(None);
    }

    dotenvy::from_path(&env_path).map_err(|e| ConfigError::EnvFile {
        path: env_path.clone(),
        message: e.to_string(),
    })?;
    Ok(Some(env_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfcvarsError;

    fn fallbacks(dir: &Path) -> Fallbacks {
        Fallbacks {
            work_dir: dir.to_path_buf(),
            credentials_path: Some(dir.join("credentials.tfrc.json")),
        }
    }

    fn write_backend(dir: &Path) {
        let terraform_dir = dir.join(".terraform");
        std::fs::create_dir_all(&terraform_dir).expect("create .terraform");
        std::fs::write(
            terraform_dir.join("terraform.tfstate"),
            r#"{"backend": {"type": "remote", "config": {
                "organization": "from-state", "workspaces": {"name": "state-ws"}}}}"#,
        )
        .expect("write state");
    }

    #[test]
    fn test_explicit_options() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = Settings::resolve(
            ConnectionOptions {
                token: Some(String::from("token")),
                hostname: None,
                organization: Some(String::from("acme")),
                workspace: Some(String::from("web")),
            },
            &fallbacks(dir.path()),
        )
        .expect("resolves");

        assert_eq!(settings.hostname, DEFAULT_HOSTNAME);
        assert_eq!(settings.organization, "acme");
        assert_eq!(settings.workspace, "web");
        assert!(!format!("{settings:?}").contains("token\""));
    }

    #[test]
    fn test_token_and_workspace_fallbacks() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_backend(dir.path());
        std::fs::write(
            dir.path().join("credentials.tfrc.json"),
            r#"{"credentials": {"tfe.example.com": {"token": "from-file"}}}"#,
        )
        .expect("write credentials");

        let settings = Settings::resolve(
            ConnectionOptions {
                hostname: Some(String::from("tfe.example.com")),
                ..ConnectionOptions::default()
            },
            &fallbacks(dir.path()),
        )
        .expect("resolves");

        assert_eq!(settings.token, "from-file");
        assert_eq!(settings.organization, "from-state");
        assert_eq!(settings.workspace, "state-ws");
    }

    #[test]
    fn test_flags_override_backend_state() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_backend(dir.path());

        let settings = Settings::resolve(
            ConnectionOptions {
                token: Some(String::from("token")),
                workspace: Some(String::from("flag-ws")),
                ..ConnectionOptions::default()
            },
            &fallbacks(dir.path()),
        )
        .expect("resolves");

        assert_eq!(settings.organization, "from-state");
        assert_eq!(settings.workspace, "flag-ws");
    }

    #[test]
    fn test_missing_token() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = Settings::resolve(ConnectionOptions::default(), &fallbacks(dir.path()));
        assert!(matches!(
            err,
            Err(TfcvarsError::Config(ConfigError::MissingToken { .. }))
        ));
    }

    #[test]
    fn test_missing_workspace() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = Settings::resolve(
            ConnectionOptions {
                token: Some(String::from("token")),
                organization: Some(String::from("acme")),
                ..ConnectionOptions::default()
            },
            &fallbacks(dir.path()),
        );
        assert!(matches!(
            err,
            Err(TfcvarsError::Config(ConfigError::MissingWorkspace))
        ));
    }

    #[test]
    fn test_load_dotenv_reports_loaded_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(load_dotenv(dir.path()).expect("no file is fine"), None);

        let env_path = dir.path().join(".env");
        std::fs::write(&env_path, "TFCVARS_TEST_DOTENV_ORG=acme\n").expect("write .env");

        assert_eq!(
            load_dotenv(dir.path()).expect("valid .env"),
            Some(env_path)
        );
        assert_eq!(
            std::env::var("TFCVARS_TEST_DOTENV_ORG").as_deref(),
            Ok("acme")
        );
    }
}
