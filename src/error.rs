//! Error types for tfcvars.
//!
//! This module provides the error hierarchy for every stage of a
//! synchronization: configuration, the remote variable store, local
//! variable documents, and plan execution.

use std::path::PathBuf;
use thiserror::Error;

use crate::planner::SyncSummary;

/// The main error type for tfcvars.
#[derive(Debug, Error)]
pub enum TfcvarsError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote variable store errors.
    #[error("Remote access error: {0}")]
    Remote(#[from] RemoteError),

    /// Local variable document errors.
    #[error("Variable file error: {0}")]
    Document(#[from] DocumentError),

    /// Synchronization errors.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API token was given and none was found in the credentials file.
    #[error("No API token found for {hostname}: pass --tfetoken, set TFE_TOKEN or run `terraform login`")]
    MissingToken {
        /// Hostname the token was looked up for.
        hostname: String,
    },

    /// The credentials file exists but could not be used.
    #[error("Failed to read credentials from {path}: {message}")]
    Credentials {
        /// Path to the credentials file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// A `.env` file exists but could not be loaded.
    #[error("Failed to load {path}: {message}")]
    EnvFile {
        /// Path to the env file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// Organization or workspace could not be determined.
    #[error("Workspace is not specified: pass --organization and --workspace or run inside a remote-backed Terraform directory")]
    MissingWorkspace,

    /// A `key=value` assignment without `=`.
    #[error("Invalid variable assignment '{assignment}': expected KEY=VALUE")]
    InvalidAssignment {
        /// The offending assignment.
        assignment: String,
    },
}

/// Remote variable store errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Authentication failed.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from API.
        message: String,
    },

    /// Network error.
    #[error("Network error: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from API.
    #[error("Invalid response from API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// Workspace does not exist or is not visible with the current token.
    #[error("Workspace not found: {organization}/{workspace}")]
    WorkspaceNotFound {
        /// Organization name.
        organization: String,
        /// Workspace name.
        workspace: String,
    },
}

/// Local variable document errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document is not valid HCL or contains unsupported constructs.
    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        /// File name or label of the parsed text.
        source_name: String,
        /// Underlying syntax diagnostic.
        message: String,
    },

    /// A variable cannot be represented in a document.
    #[error("Invalid variable: {message}")]
    InvalidVariable {
        /// Description of the problem.
        message: String,
    },

    /// A value string is not a valid HCL expression.
    #[error("Invalid value '{value}': {message}")]
    InvalidValue {
        /// The raw value text.
        value: String,
        /// Underlying diagnostic.
        message: String,
    },

    /// A required variable file does not exist.
    #[error("Variable file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },
}

/// Synchronization errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The named variable does not exist in the workspace.
    #[error("Variable '{key}' not found")]
    VariableNotFound {
        /// Requested key.
        key: String,
    },

    /// The confirmation prompt could not be read.
    #[error("Failed to read confirmation: {message}")]
    Input {
        /// Description of the failure.
        message: String,
    },

    /// An action failed after zero or more actions were already applied.
    #[error("Failed to {action}: {reason} (already applied: {completed})")]
    ActionFailed {
        /// Description of the failed action.
        action: String,
        /// Actions completed before the failure.
        completed: SyncSummary,
        /// Underlying failure.
        reason: String,
    },
}

/// Result type alias for tfcvars operations.
pub type Result<T> = std::result::Result<T, TfcvarsError>;

impl DocumentError {
    /// Creates a parse error for the named source.
    #[must_use]
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid variable error.
    #[must_use]
    pub fn invalid_variable(message: impl Into<String>) -> Self {
        Self::InvalidVariable {
            message: message.into(),
        }
    }
}

impl RemoteError {
    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

impl SyncError {
    /// Creates an input error.
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }
}
