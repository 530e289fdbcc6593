//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying variables and
//! command results to the user.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::error::Result;
use crate::planner::{DiffEngine, SyncOutcome};
use crate::variables::{Variable, VariableDocument};

use super::commands::ShowFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: ShowFormat,
}

/// Variable row for table display.
#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Sensitive")]
    sensitive: bool,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Variable> for VariableRow {
    fn from(v: &Variable) -> Self {
        Self {
            key: v.key.clone(),
            value: v.value.clone(),
            sensitive: v.sensitive,
            description: v.description.clone(),
        }
    }
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: ShowFormat) -> Self {
        Self { format }
    }

    /// Formats variables for `show`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tfvars format is requested and a variable
    /// cannot be written to a document.
    pub fn format_variables(&self, variables: &[Variable]) -> Result<String> {
        match self.format {
            ShowFormat::Detail => Ok(Self::format_detail(variables)),
            ShowFormat::Tfvars => Ok(VariableDocument::from_variables(variables)?.to_string()),
            ShowFormat::Table => {
                let rows: Vec<VariableRow> = variables.iter().map(VariableRow::from).collect();
                let mut output = Table::new(rows).to_string();
                output.push('\n');
                Ok(output)
            }
        }
    }

    fn format_detail(variables: &[Variable]) -> String {
        let mut output = String::new();
        for v in variables {
            let _ = writeln!(output, "Key: {}", v.key);
            let _ = writeln!(output, "Value: {}", v.value);
            let _ = writeln!(output, "Description: {}", v.description);
            let _ = writeln!(output, "Sensitive: {}", v.sensitive);
            output.push('\n');
        }
        output
    }

    /// Colors a rendered diff.
    #[must_use]
    pub fn format_diff(rendered: &str) -> String {
        DiffEngine::new().colorize(rendered)
    }

    /// Formats the end of a mutating command.
    ///
    /// `NoChanges` yields nothing; the reconciler already reported it.
    #[must_use]
    pub fn format_outcome(outcome: &SyncOutcome) -> String {
        match outcome {
            SyncOutcome::NoChanges => String::new(),
            SyncOutcome::Aborted => format!("{}\n", "Aborted, no changes applied.".yellow()),
            SyncOutcome::Applied(summary) => format!("{} {summary}\n", "✓".green()),
        }
    }
}
