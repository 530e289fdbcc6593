//! Terraform CLI credentials file.
//!
//! `terraform login` stores API tokens in
//! `~/.terraform.d/credentials.tfrc.json`:
//!
//! ```json
//! { "credentials": { "app.terraform.io": { "token": "..." } } }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, Result};

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    credentials: HashMap<String, HostCredentials>,
}

#[derive(Debug, Deserialize)]
struct HostCredentials {
    token: Option<String>,
}

/// Returns the default credentials file location.
#[must_use]
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".terraform.d").join("credentials.tfrc.json"))
}

/// Reads the token stored for `hostname`.
///
/// A missing file or a file without an entry for the host yields `None`.
///
/// # Errors
///
/// Returns [`ConfigError::Credentials`] if the file exists but cannot be
/// read or is not valid JSON.
pub fn read_token(path: &Path, hostname: &str) -> Result<Option<String>> {
    let credentials_error = |message: String| ConfigError::Credentials {
        path: path.to_path_buf(),
        message,
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Credentials file not found: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(credentials_error(e.to_string()).into()),
    };

    let file: CredentialsFile =
        serde_json::from_str(&content).map_err(|e| credentials_error(e.to_string()))?;

    Ok(file
        .credentials
        .get(hostname)
        .and_then(|host| host.token.clone())
        .filter(|token| !token.is_empty()))
}
