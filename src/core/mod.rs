//! Core orchestration logic.
//!
//! This module contains:
//! - Step: the command/marker/effect sum type and the Plan builder
//! - MilestoneRegistry: ordered key -> label mappings
//! - ProgressLog: append-only JSONL progress persistence
//! - Orchestrator: the run loop
//! - Roles: Installer and Remover wrappers

pub mod error;
pub mod milestones;
pub mod orchestrator;
pub mod progress_log;
pub mod roles;
pub mod step;

// Re-export commonly used types
pub use error::ExecutionError;
pub use milestones::{standard_registry, Milestone, MilestoneRegistry};
pub use orchestrator::{Orchestrator, RunReport, RunSpec, DEFAULT_COMMAND_TIMEOUT};
pub use progress_log::{ProgressLog, ProgressLogError, ProgressStore};
pub use roles::{FailureHook, Installer, Remover};
pub use step::{EffectFn, EffectOutcome, Plan, Step};
