//! CLI module for tfcvars.
//!
//! This module provides the command-line interface for synchronizing
//! Terraform Cloud workspace variables.

mod commands;
mod output;

pub use commands::{Cli, Commands, ReadArgs, ShowFormat};
pub use output::OutputFormatter;
