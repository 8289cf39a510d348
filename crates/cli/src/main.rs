mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensorplan_core::{load_config, validate_config, JobKind};

/// Exit status when jobs ended failed (or unfinished) and failures are not tolerated.
const EXIT_JOBS_FAILED: u8 = 2;

/// Plan and run satellite sensor ingestion and matchup jobs over a host pool.
#[derive(Debug, Parser)]
#[command(name = "sensorplan", version, about)]
struct Cli {
    /// Workflow configuration file.
    #[arg(long, short, env = "SENSORPLAN_CONFIG", default_value = "workflow.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the plan without executing anything.
    Plan {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Run ingestion jobs.
    Ingest(RunArgs),
    /// Run matchup jobs.
    Matchup(RunArgs),
    /// Print the persisted state of a plan.
    Status {
        #[arg(value_enum)]
        kind: KindArg,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Directory for job logs and the report (overrides run.log_dir).
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log what would run without executing anything.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Ingestion,
    Matchup,
}

impl From<KindArg> for JobKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ingestion => JobKind::Ingestion,
            KindArg::Matchup => JobKind::Matchup,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!(usecase = %config.usecase, "Configuration loaded");

    let success = match cli.command {
        Command::Plan { kind } => commands::plan(&config, kind.into())?,
        Command::Status { kind, json } => commands::status(&config, kind.into(), json)?,
        Command::Ingest(args) => {
            commands::run(&config, JobKind::Ingestion, args.log_dir, args.dry_run).await?
        }
        Command::Matchup(args) => {
            commands::run(&config, JobKind::Matchup, args.log_dir, args.dry_run).await?
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_JOBS_FAILED)
    })
}
