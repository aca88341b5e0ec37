//! SSH executor spawning the system `ssh` client as a subprocess.
//!
//! Commands run non-interactively (`BatchMode=yes`); the caller's timeout
//! bounds the whole session. Output is captured, never streamed.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::{HostRef, Identity};

use super::{ExecError, ExecOutput, RemoteExecutor};

/// Remote executor using the system ssh client
pub struct SshExecutor {
    /// Path to the ssh binary (default: "ssh")
    binary_path: String,

    /// Target host
    host: HostRef,

    /// Extra ssh options (each passed as `-o <option>`)
    options: Vec<String>,
}

impl SshExecutor {
    /// Create an executor for a host with default ssh settings
    pub fn new(host: HostRef) -> Self {
        Self {
            binary_path: "ssh".to_string(),
            host,
            options: vec![
                "BatchMode=yes".to_string(),
                "StrictHostKeyChecking=accept-new".to_string(),
            ],
        }
    }

    /// Use a custom ssh binary path
    pub fn with_binary_path(mut self, binary_path: impl Into<String>) -> Self {
        self.binary_path = binary_path.into();
        self
    }

    /// Replace the ssh options
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Build the argument vector for one command invocation
    fn build_args(&self, command: &str, identity: &Identity) -> Vec<String> {
        let mut args = Vec::new();

        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }

        if let Some(port) = self.host.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }

        args.push(format!("{}@{}", identity.user, self.host.address));
        args.push(command.to_string());
        args
    }
}

#[async_trait::async_trait]
impl RemoteExecutor for SshExecutor {
    fn name(&self) -> &str {
        "ssh"
    }

    async fn run(
        &self,
        command: &str,
        identity: &Identity,
        deadline: Duration,
    ) -> Result<ExecOutput, ExecError> {
        let args = self.build_args(command, identity);
        debug!(host = %self.host, user = %identity.user, %command, "Spawning ssh session");

        let child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reap the session if the timeout drops the wait future
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let output = timeout(deadline, child.wait_with_output())
            .await
            .map_err(|_| ExecError::TimedOut {
                command: command.to_string(),
                timeout: deadline,
            })?
            .map_err(|source| ExecError::Io {
                command: command.to_string(),
                source,
            })?;

        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
