//! Subcommand implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use sensorplan_core::{
    JobKind, RunControl, RunOptions, RunStateStore, SqliteRunStateStore, Workflow,
    WorkflowConfig,
};

/// Prints the plan of `kind`. Always succeeds once planned.
pub fn plan(config: &WorkflowConfig, kind: JobKind) -> Result<bool> {
    let workflow = Workflow::from_config(config).context("Invalid workflow")?;
    let plan = workflow
        .plan(kind)
        .with_context(|| format!("Cannot plan {}", kind))?;

    println!("usecase  {}", workflow.usecase());
    println!("kind     {}", plan.kind);
    println!("window   {}", plan.window);
    println!("slots    {}", plan.slot_count());
    for sensor in &plan.sensors {
        println!("sensor   {}", sensor);
    }
    for pair in &plan.pairs {
        println!("pair     {} {}", pair.key(), pair.overlap());
    }
    println!("jobs     {}", plan.job_count());
    Ok(true)
}

/// Runs `kind` jobs. Returns whether the run counts as successful.
pub async fn run(
    config: &WorkflowConfig,
    kind: JobKind,
    log_dir: Option<PathBuf>,
    dry_run: bool,
) -> Result<bool> {
    let control = RunControl::new();
    let mut workflow = Workflow::from_config(config)
        .context("Invalid workflow")?
        .with_control(control.clone());
    if !dry_run {
        workflow = workflow.with_state_store(open_state_store(config)?);
    }

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Stop requested, waiting for running jobs to finish");
            control.stop();
        }
    });

    let options = RunOptions::new(log_dir.unwrap_or_else(|| config.run.log_dir.clone()))
        .with_dry_run(dry_run);
    let run = workflow
        .run(kind, &config.hosts, &options)
        .await
        .with_context(|| format!("{} run failed", kind))?;

    println!("{}", run.report.render());
    let success = run.is_success(config.run.tolerate_failures);
    info!(
        report = %run.report_path.display(),
        success,
        stopped = run.result.stopped,
        "Run complete"
    );
    Ok(success)
}

/// Prints the persisted state of the `kind` plan.
pub fn status(config: &WorkflowConfig, kind: JobKind, json: bool) -> Result<bool> {
    let mut workflow = Workflow::from_config(config).context("Invalid workflow")?;
    if config.state_db_path().exists() {
        workflow = workflow.with_state_store(open_state_store(config)?);
    } else {
        info!(path = %config.state_db_path().display(), "No run state yet");
    }

    let report = workflow
        .status(kind)
        .with_context(|| format!("Cannot read {} status", kind))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!("{}", report.render());
    }
    Ok(report.is_complete(config.run.tolerate_failures))
}

fn open_state_store(config: &WorkflowConfig) -> Result<Arc<dyn RunStateStore>> {
    std::fs::create_dir_all(&config.run.state_dir).with_context(|| {
        format!(
            "Failed to create state directory {:?}",
            config.run.state_dir
        )
    })?;
    let path = config.state_db_path();
    let store = SqliteRunStateStore::new(&path)
        .with_context(|| format!("Failed to open run state {:?}", path))?;
    Ok(Arc::new(store))
}
