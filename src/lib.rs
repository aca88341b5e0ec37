//! provis - remote server provisioning orchestrator
//!
//! Provisions and manages packages on remote servers by executing ordered
//! shell-command sequences over SSH, while persisting a milestone-bucketed
//! progress trail for external observers.
//!
//! # Architecture
//!
//! - A `Plan` is an ordered sequence of steps: literal commands, milestone
//!   markers, and local effect closures
//! - The `Orchestrator` drives a plan through a `RemoteExecutor` and a
//!   `ProgressStore`, fail-fast, converting failures into one
//!   `ExecutionError`
//! - `Installer`/`Remover` select the run direction and failure-hook
//!   behavior
//! - Progress is persisted as append-only JSONL snapshots; observers fold
//!   the log to the latest state per milestone
//!
//! # Modules
//!
//! - `core`: orchestration logic (Orchestrator, Plan, MilestoneRegistry,
//!   ProgressLog, roles)
//! - `domain`: data structures (ProgressEvent, PackageCategory, Identity)
//! - `exec`: remote execution (RemoteExecutor trait, SshExecutor)
//! - `packages`: YAML blueprint loading
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Install a package from a blueprint
//! provis install blueprints/nginx.yaml --host 10.0.0.5
//!
//! # Inspect a run's progress trail
//! provis status <run-id>
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod exec;
pub mod packages;

// Re-export main types at crate root for convenience
pub use self::core::{
    standard_registry, EffectOutcome, ExecutionError, Installer, MilestoneRegistry, Orchestrator,
    Plan, ProgressLog, ProgressStore, Remover, RunReport, RunSpec, Step,
};
pub use domain::{
    resolve_identity, Direction, EventStatus, HostRef, Identity, IdentityDefaults,
    PackageCategory, ProgressEvent, ResourceStatus,
};
pub use exec::{ExecError, ExecOutput, RemoteExecutor, SshExecutor};
pub use packages::Blueprint;
