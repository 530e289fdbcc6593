//! Variable model and the `.tfvars` document format.
//!
//! This module provides:
//! - [`Variable`] and [`Category`], the storage-independent variable model
//! - [`ValueCodec`], conversion between HCL values and flat strings
//! - [`VariableDocument`], a format-preserving variable file

mod document;
mod format;
mod placeholder;
mod types;
mod value;

pub use document::VariableDocument;
pub use types::{Category, Variable, filter_env, find_by_key};
pub use value::ValueCodec;
