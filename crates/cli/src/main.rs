use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::*;
use dev_core::types::DevError;
use dev_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

mod commands;

/// dev - Runs the repository's development targets
#[derive(Parser)]
#[command(name = "dev")]
#[command(about = "Builds, tests, lints and publishes the solution through named targets")]
#[command(version)]
struct Cli {
    /// Targets to run (defaults to `default`)
    targets: Vec<String>,

    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Project configuration file (defaults to `<workspace>/.dev/config.yml`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List targets instead of running them
    #[arg(long, conflicts_with_all = ["dry_run", "graph", "schema"])]
    list: bool,

    /// Show the execution plan without running anything
    #[arg(long, conflicts_with_all = ["graph", "schema"])]
    dry_run: bool,

    /// Show the target dependency graph
    #[arg(long, conflicts_with = "schema")]
    graph: bool,

    /// Print the JSON schema of the project configuration file
    #[arg(long)]
    schema: bool,

    /// Run only the named targets, not their dependencies
    #[arg(long)]
    skip_dependencies: bool,

    /// Maximum number of fan-out items running at once
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    parallel: u16,

    /// Log diagnostics to stderr
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), describe(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute(cli: Cli) -> Result<()> {
    if cli.schema {
        return commands::schema::execute();
    }

    tracing::debug!(workspace = %cli.workspace.display(), targets = ?cli.targets, "starting");

    // Initialize workspace manager with all business logic
    let manager = WorkspaceManager::new(WorkspaceManagerConfig {
        workspace_root: cli.workspace,
        config_path: cli.config,
        parallelism: usize::from(cli.parallel),
    })?;

    // Execute command (CLI layer only handles presentation)
    if cli.list {
        commands::list::execute(&manager)
    } else if cli.graph {
        commands::graph::execute(&manager)
    } else if cli.dry_run {
        commands::plan::execute(&manager, &cli.targets, cli.skip_dependencies)
    } else {
        commands::run::execute(&manager, &cli.targets, cli.skip_dependencies).await
    }
}

/// Library errors already carry their causes in their message
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DevError>() {
        Some(dev_error) => dev_error.to_string(),
        None => format!("{:#}", err),
    }
}
