//! Remote execution interfaces.
//!
//! The orchestrator only needs one contract: run a command string on the
//! target host under a chosen identity with a bounded timeout, and get back
//! the exit code and captured output. A non-zero exit is data, not an
//! executor error; only transport-level problems (spawn failure, timeout)
//! surface as `ExecError`.

pub mod ssh;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Identity;

// Re-export the ssh executor
pub use ssh::SshExecutor;

/// Captured result of one remote command
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Process exit code (-1 if terminated by signal)
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

impl ExecOutput {
    /// Whether the command exited zero
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Transport-level executor failures
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn remote session for command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{command}' exceeded timeout of {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("I/O error while running command '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for remote command executors
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Human-readable executor name
    fn name(&self) -> &str;

    /// Run one command under the given identity with a bounded timeout
    async fn run(
        &self,
        command: &str,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError>;
}
