//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ConnectionOptions, DEFAULT_HOSTNAME};
use crate::reconciler::ReadOptions;

/// Default variable file.
const DEFAULT_VAR_FILE: &str = "terraform.tfvars";

/// tfcvars - Synchronize Terraform Cloud variables with a local tfvars file.
#[derive(Parser, Debug)]
#[command(name = "tfcvars")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The token used to authenticate with Terraform Cloud.
    #[arg(long, global = true, env = "TFE_TOKEN", hide_env_values = true)]
    pub tfetoken: Option<String>,

    /// Terraform Cloud or Enterprise hostname.
    #[arg(long, global = true, env = "TFE_HOSTNAME", default_value = DEFAULT_HOSTNAME)]
    pub hostname: String,

    /// Terraform Cloud organization name to deal with.
    #[arg(short, long, global = true, env = "TFCVARS_ORGANIZATION")]
    pub organization: Option<String>,

    /// Terraform Cloud workspace name to deal with.
    #[arg(short, long, global = true, env = "TFCVARS_WORKSPACE")]
    pub workspace: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show variables on Terraform Cloud.
    Show {
        /// Show local variables instead.
        #[arg(long)]
        local: bool,

        /// Input filename to read for local variables.
        #[arg(long, default_value = DEFAULT_VAR_FILE)]
        var_file: PathBuf,

        /// Show only the specified variable.
        #[arg(long)]
        variable: Option<String>,

        /// Format to display variables.
        #[arg(long, value_enum, default_value_t = ShowFormat::Detail)]
        format: ShowFormat,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Show differences between the local tfvars file and Terraform Cloud.
    Diff {
        /// Input filename to compare.
        #[arg(long, default_value = DEFAULT_VAR_FILE)]
        var_file: PathBuf,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Update the local tfvars file with Terraform Cloud variables.
    Pull {
        /// Output filename to write.
        #[arg(long, default_value = DEFAULT_VAR_FILE)]
        var_file: PathBuf,

        /// Overwrite the existing file instead of merging into it.
        #[arg(long)]
        overwrite: bool,

        /// Merge into the existing file (wins over --overwrite).
        #[arg(long)]
        merge: bool,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Update Terraform Cloud variables with the local tfvars file.
    Push {
        /// Input filename to push.
        #[arg(long, default_value = DEFAULT_VAR_FILE)]
        var_file: PathBuf,

        /// Create or update a single variable given as KEY=VALUE.
        #[arg(long)]
        variable: Option<String>,

        /// Delete remote variables not defined locally.
        #[arg(long)]
        delete: bool,

        /// Skip the confirmation prompt.
        #[arg(long)]
        auto_approve: bool,
    },

    /// Remove a variable from Terraform Cloud.
    Rm {
        /// Key of the variable to remove.
        #[arg(long)]
        variable: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        auto_approve: bool,
    },
}

/// Flags selecting which remote variables are read.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ReadArgs {
    /// Include env category variables.
    #[arg(long)]
    pub include_env: bool,

    /// Include variable set variables.
    #[arg(long)]
    pub include_variable_set: bool,
}

/// Display formats of `show`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ShowFormat {
    /// One `Key/Value/Description/Sensitive` block per variable.
    #[default]
    Detail,
    /// A tfvars document.
    Tfvars,
    /// A table.
    Table,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the connection options given on the command line.
    #[must_use]
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            token: self.tfetoken.clone(),
            hostname: Some(self.hostname.clone()),
            organization: self.organization.clone(),
            workspace: self.workspace.clone(),
        }
    }
}

impl From<ReadArgs> for ReadOptions {
    fn from(args: ReadArgs) -> Self {
        Self {
            include_env: args.include_env,
            include_variable_set: args.include_variable_set,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_push() {
        let cli = Cli::try_parse_from([
            "tfcvars",
            "-o",
            "acme",
            "-w",
            "web",
            "push",
            "--variable",
            "environment=test",
            "--auto-approve",
        ])
        .expect("valid arguments");

        assert_eq!(cli.organization.as_deref(), Some("acme"));
        match cli.command {
            Commands::Push {
                variable,
                auto_approve,
                delete,
                var_file,
            } => {
                assert_eq!(variable.as_deref(), Some("environment=test"));
                assert!(auto_approve);
                assert!(!delete);
                assert_eq!(var_file, PathBuf::from("terraform.tfvars"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_show_defaults() {
        let cli = Cli::try_parse_from(["tfcvars", "show", "--include-env"]).expect("valid arguments");
        match cli.command {
            Commands::Show {
                local,
                format,
                read,
                ..
            } => {
                assert!(!local);
                assert_eq!(format, ShowFormat::Detail);
                assert!(read.include_env);
                assert!(!read.include_variable_set);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rm_requires_variable() {
        assert!(Cli::try_parse_from(["tfcvars", "rm"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tfcvars", "diff", "-w", "web", "--tfetoken", "t"])
            .expect("valid arguments");
        let options = cli.connection_options();
        assert_eq!(options.workspace.as_deref(), Some("web"));
        assert_eq!(options.token.as_deref(), Some("t"));
    }
}
