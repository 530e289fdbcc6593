//! Configuration module for tfcvars.
//!
//! This module handles all configuration-related functionality:
//! - Resolving the API token, hostname, organization and workspace
//! - Reading tokens from the Terraform CLI credentials file
//! - Discovering the workspace from local backend state

mod backend;
mod credentials;
mod settings;

pub use backend::{BackendWorkspace, discover_workspace};
pub use credentials::{default_credentials_path, read_token};
pub use settings::{ConnectionOptions, DEFAULT_HOSTNAME, Fallbacks, Settings, load_dotenv};
