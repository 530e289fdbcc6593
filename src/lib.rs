// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![warn(missing_docs)]                // All public items must be documented
#![warn(dead_code)]                   // Unused code is reported
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![warn(unused_imports)]              // Unused imports are reported
#![warn(unused_variables)]            // Unused variables are reported
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tfcvars
//!
//! Synchronize Terraform Cloud workspace variables with a local `.tfvars`
//! file.
//!
//! ## Overview
//!
//! tfcvars treats the workspace variables and the local file as two views of
//! the same variable collection:
//!
//! - `show` lists remote (or local) variables
//! - `diff` compares the local file with the workspace
//! - `pull` writes workspace variables into the local file
//! - `push` creates, updates and optionally deletes workspace variables
//! - `rm` deletes a single workspace variable
//!
//! ## Architecture
//!
//! 1. **Documents**: the local file is parsed into an ordered,
//!    comment-preserving [`VariableDocument`]
//! 2. **Remote**: the workspace is read through the [`VariableStore`] trait
//! 3. **Reconciler**: reshapes, diffs and plans between the two sides
//!
//! ## Modules
//!
//! - [`variables`]: Variable model, value codec and tfvars documents
//! - [`planner`]: Line diffs, sync plans and their execution
//! - [`store`]: Remote store traits and the Terraform Cloud client
//! - [`config`]: Token, hostname and workspace resolution
//! - [`reconciler`]: The show/diff/pull/push/rm flows
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```text
//! $ tfcvars -o acme -w web diff
//! - environment = "env"
//! + environment = "development"
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod reconciler;
pub mod store;
pub mod variables;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::Settings;
pub use error::{Result, TfcvarsError};
pub use planner::{DiffEngine, PlanExecutor, SyncPlan, SyncPlanner};
pub use reconciler::Reconciler;
pub use store::{TfcClient, VariableSetStore, VariableStore};
pub use variables::{ValueCodec, Variable, VariableDocument};
