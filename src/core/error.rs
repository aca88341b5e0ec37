//! Failure taxonomy for orchestrator runs.
//!
//! Every failure aborts the remainder of the sequence and surfaces as one
//! `ExecutionError`. The orchestrator never retries; bounded-attempt retry
//! with backoff belongs to the calling job.

use std::time::Duration;

use thiserror::Error;

use crate::core::progress_log::ProgressLogError;
use crate::exec::ExecError;

/// A run-aborting failure
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Remote command exited non-zero
    #[error("command '{command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// Remote command exceeded its allotted time
    #[error("command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// An effect closure raised before producing a command or side effect
    #[error("effect step failed: {message}")]
    Effect { message: String },

    /// Transport-level failure distinct from a command that ran and failed
    #[error("remote executor error: {0}")]
    Executor(#[source] ExecError),

    /// Progress trail could not be persisted
    #[error("failed to persist progress: {0}")]
    Store(#[from] ProgressLogError),
}

impl ExecutionError {
    /// Classify a transport error, promoting timeouts to their own kind
    pub(crate) fn from_exec(err: ExecError) -> Self {
        match err {
            ExecError::TimedOut { command, timeout } => Self::Timeout { command, timeout },
            other => Self::Executor(other),
        }
    }
}
