//! tfcvars CLI entrypoint.
//!
//! This is the main entrypoint for the tfcvars command-line tool.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tfcvars::cli::{Cli, Commands, OutputFormatter, ReadArgs, ShowFormat};
use tfcvars::config::{Fallbacks, Settings, load_dotenv};
use tfcvars::error::Result;
use tfcvars::reconciler::{PushOptions, ReadOptions, Reconciler, select};
use tfcvars::store::TfcClient;
use tfcvars::variables::{Variable, VariableDocument, filter_env};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // Variables from .env feed the flag defaults, so load them first
    let dotenv = match load_dotenv(Path::new(".")) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);
    match dotenv {
        Some(path) => info!("Loaded environment from: {}", path.display()),
        None => debug!("No .env file in the current directory"),
    }

    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    // Run async runtime
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// Logs go to stderr so that stdout only carries command output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    // Local show needs neither a token nor a workspace
    if let Commands::Show {
        local: true,
        var_file,
        variable,
        format,
        read,
    } = &cli.command
    {
        return cmd_show_local(var_file, variable.as_deref(), *format, *read);
    }

    let settings = Settings::resolve(
        cli.connection_options(),
        &Fallbacks {
            work_dir: PathBuf::from("."),
            credentials_path: None,
        },
    )?;
    debug!("Resolved settings: {settings:?}");

    let client = TfcClient::new(&settings.hostname, &settings.token)?;
    let workspace = client
        .read_workspace(&settings.organization, &settings.workspace)
        .await?;
    info!("Workspace {} has id {}", workspace.name, workspace.id);

    let reconciler = Reconciler::new(&client, &client, &workspace.id);

    match cli.command {
        Commands::Show {
            variable,
            format,
            read,
            ..
        } => cmd_show(&reconciler, variable.as_deref(), format, read).await,
        Commands::Diff { var_file, read } => cmd_diff(&reconciler, &var_file, read).await,
        Commands::Pull {
            var_file,
            overwrite,
            merge,
            read,
        } => cmd_pull(&reconciler, &var_file, overwrite && !merge, read).await,
        Commands::Push {
            var_file,
            variable,
            delete,
            auto_approve,
        } => {
            let options = PushOptions {
                delete,
                auto_approve,
            };
            cmd_push(&reconciler, &var_file, variable.as_deref(), options).await
        }
        Commands::Rm {
            variable,
            auto_approve,
        } => cmd_rm(&reconciler, &variable, auto_approve).await,
    }
}

/// Show variables of the local file.
fn cmd_show_local(
    var_file: &Path,
    key: Option<&str>,
    format: ShowFormat,
    read: ReadArgs,
) -> Result<()> {
    info!("Reading local variables from: {}", var_file.display());

    let doc = VariableDocument::from_file(var_file, true)?;
    let variables = filter_env(select(doc.variables(), key), read.include_env);

    let output = OutputFormatter::new(format).format_variables(&variables)?;
    write!(io::stdout().lock(), "{output}")?;
    Ok(())
}

/// Show variables of the workspace.
async fn cmd_show(
    reconciler: &Reconciler<'_>,
    key: Option<&str>,
    format: ShowFormat,
    read: ReadArgs,
) -> Result<()> {
    let variables = reconciler.show(ReadOptions::from(read), key).await?;

    let output = OutputFormatter::new(format).format_variables(&variables)?;
    write!(io::stdout().lock(), "{output}")?;
    Ok(())
}

/// Show differences between the local file and the workspace.
async fn cmd_diff(reconciler: &Reconciler<'_>, var_file: &Path, read: ReadArgs) -> Result<()> {
    let local = VariableDocument::from_file(var_file, false)?;

    match reconciler.diff(&local, ReadOptions::from(read)).await? {
        Some(rendered) => {
            let output = OutputFormatter::format_diff(&rendered);
            write!(io::stdout().lock(), "{output}")?;
        }
        None => info!("{} is up to date", var_file.display()),
    }
    Ok(())
}

/// Write workspace variables into the local file.
async fn cmd_pull(
    reconciler: &Reconciler<'_>,
    var_file: &Path,
    overwrite: bool,
    read: ReadArgs,
) -> Result<()> {
    let local = VariableDocument::from_file(var_file, false)?;
    let doc = reconciler
        .pull(local, ReadOptions::from(read), overwrite)
        .await?;

    doc.write_to(var_file)?;
    info!("Wrote {}", var_file.display());
    Ok(())
}

/// Update workspace variables from the local file or a single assignment.
async fn cmd_push(
    reconciler: &Reconciler<'_>,
    var_file: &Path,
    assignment: Option<&str>,
    options: PushOptions,
) -> Result<()> {
    let source = match assignment {
        Some(assignment) => vec![Variable::from_assignment(assignment)?],
        None => VariableDocument::from_file(var_file, true)?.variables(),
    };
    debug!("Pushing {} variables", source.len());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();

    let outcome = reconciler.push(&source, options, &mut input, &mut out).await?;
    write!(out, "{}", OutputFormatter::format_outcome(&outcome))?;
    Ok(())
}

/// Remove a single workspace variable.
async fn cmd_rm(reconciler: &Reconciler<'_>, key: &str, auto_approve: bool) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();

    let outcome = reconciler
        .remove(key, auto_approve, &mut input, &mut out)
        .await?;
    write!(out, "{}", OutputFormatter::format_outcome(&outcome))?;
    Ok(())
}
