//! Command-line interface for provis.
//!
//! The CLI stands in for the background job that would normally dispatch
//! runs: it builds the plan from a blueprint, wires the ssh executor and
//! the progress log, invokes the role wrapper, and reports the trail.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config;
use crate::core::{Installer, Orchestrator, ProgressLog, Remover};
use crate::domain::{resolve_identity, Direction, EventStatus, HostRef, ProgressEvent};
use crate::exec::SshExecutor;
use crate::packages::Blueprint;

/// provis - remote server provisioning orchestrator
#[derive(Parser, Debug)]
#[command(name = "provis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a package on a host
    Install {
        /// Path to the package blueprint YAML
        blueprint: PathBuf,

        /// Target host address
        #[arg(long)]
        host: String,

        /// SSH port (ssh default if omitted)
        #[arg(long)]
        port: Option<u16>,

        /// Remote account override (defaults by package scope)
        #[arg(long)]
        identity: Option<String>,

        /// Per-command timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Remove a package from a host
    Remove {
        /// Path to the package blueprint YAML
        blueprint: PathBuf,

        /// Target host address
        #[arg(long)]
        host: String,

        /// SSH port (ssh default if omitted)
        #[arg(long)]
        port: Option<u16>,

        /// Remote account override (defaults by package scope)
        #[arg(long)]
        identity: Option<String>,

        /// Per-command timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show the progress trail of a run
    Status {
        /// Run ID (UUID)
        run_id: String,
    },

    /// List recent runs
    Runs {
        /// Maximum number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Install {
                blueprint,
                host,
                port,
                identity,
                timeout,
            } => dispatch(Direction::Install, blueprint, host, port, identity, timeout).await,

            Commands::Remove {
                blueprint,
                host,
                port,
                identity,
                timeout,
            } => dispatch(Direction::Remove, blueprint, host, port, identity, timeout).await,

            Commands::Status { run_id } => show_status(&run_id).await,

            Commands::Runs { limit } => list_runs(limit).await,
        }
    }
}

async fn dispatch(
    direction: Direction,
    blueprint_path: PathBuf,
    host: String,
    port: Option<u16>,
    identity_override: Option<String>,
    timeout_seconds: Option<u64>,
) -> Result<()> {
    let config = config::get()?;

    let blueprint = Blueprint::from_file(&blueprint_path)?;
    blueprint.validate()?;

    if direction == Direction::Remove && !blueprint.is_removable() {
        anyhow::bail!(
            "Blueprint '{}' declares no remove_milestones",
            blueprint.name
        );
    }

    let host = match port {
        Some(port) => HostRef::with_port(host, port),
        None => HostRef::new(host),
    };

    let identity = resolve_identity(
        blueprint.category,
        identity_override
            .as_deref()
            .or(blueprint.identity.as_deref()),
        &config.identities,
    );

    let command_timeout = timeout_seconds
        .map(Duration::from_secs)
        .unwrap_or(config.command_timeout);

    let run_id = Uuid::new_v4();
    let log = Arc::new(ProgressLog::open(run_id).await?);

    let executor = Arc::new(
        SshExecutor::new(host.clone())
            .with_binary_path(config.ssh_binary.clone())
            .with_options(config.ssh_options.clone()),
    );

    let orchestrator = Orchestrator::new(executor, log.clone());
    let plan = blueprint.plan(direction);
    let registry = blueprint.registry(direction);

    println!(
        "{} '{}' on {} as {} (run {})",
        direction.action_label(),
        blueprint.name,
        host,
        identity,
        run_id
    );

    let result = match direction {
        Direction::Install => {
            Installer::new(orchestrator)
                .with_command_timeout(command_timeout)
                .execute(plan, &registry, host, blueprint.category, identity, run_id)
                .await
        }
        Direction::Remove => {
            let package = blueprint.name.clone();
            Remover::new(orchestrator)
                .with_command_timeout(command_timeout)
                .with_failure_hook(move |message| {
                    eprintln!("Package '{}' flagged as failed: {}", package, message);
                })
                .execute(plan, &registry, host, blueprint.category, identity, run_id)
                .await
        }
    };

    // Print the trail from the log so failed milestones show too
    let events = log.replay().await?;
    print_trail(&events);

    match result {
        Ok(_) => {
            println!("Run {} completed", run_id);
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err).context(format!("Run {} failed", run_id))),
    }
}

async fn show_status(run_id: &str) -> Result<()> {
    let run_id = Uuid::parse_str(run_id).context("Invalid run ID (expected UUID)")?;

    let log = ProgressLog::for_run(run_id)?;
    let events = log.replay().await?;

    if events.is_empty() {
        anyhow::bail!("No progress recorded for run {}", run_id);
    }

    let first = &events[0];
    println!(
        "Run {} — {} {} on {}",
        run_id, first.direction, first.category, first.host
    );
    print_trail(&events);

    Ok(())
}

async fn list_runs(limit: usize) -> Result<()> {
    let run_ids = ProgressLog::list_runs().await?;

    if run_ids.is_empty() {
        println!("No runs recorded");
        return Ok(());
    }

    let mut summaries = Vec::new();
    for run_id in run_ids {
        let log = ProgressLog::for_run(run_id)?;
        let events = log.replay().await?;
        if let Some(first) = events.first() {
            summaries.push((first.created_at, run_id, events));
        }
    }

    // Most recent first
    summaries.sort_by(|a, b| b.0.cmp(&a.0));

    for (started_at, run_id, events) in summaries.into_iter().take(limit) {
        let first = &events[0];
        let state = overall_state(&events);
        println!(
            "{}  {:<9} {} {} on {} ({}/{} milestones)",
            run_id,
            state,
            first.direction,
            first.category,
            first.host,
            events
                .iter()
                .filter(|e| e.status == EventStatus::Success)
                .count(),
            first.total_steps,
        );
        println!("    started {}", started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

fn overall_state(events: &[ProgressEvent]) -> &'static str {
    if events.iter().any(|e| e.status == EventStatus::Failed) {
        "failed"
    } else if events.iter().any(|e| e.status == EventStatus::Pending) {
        "running"
    } else {
        "completed"
    }
}

fn print_trail(events: &[ProgressEvent]) {
    for event in events {
        let mark = match event.status {
            EventStatus::Pending => "…",
            EventStatus::Success => "ok",
            EventStatus::Failed => "FAILED",
        };
        println!(
            "  [{}/{}] {:<30} {}",
            event.step_index, event.total_steps, event.milestone_label, mark
        );
        if let Some(error) = &event.error {
            println!("          {}", error);
        }
    }
}
