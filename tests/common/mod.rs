//! Shared test doubles: a scripted remote executor and an in-memory
//! progress store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use provis::core::{ProgressLogError, ProgressStore};
use provis::domain::{EventStatus, Identity, ProgressEvent};
use provis::exec::{ExecError, ExecOutput, RemoteExecutor};

/// One recorded executor call
#[derive(Debug, Clone)]
pub struct Call {
    pub command: String,
    pub user: String,
    pub timeout: Duration,
}

/// Executor that records calls and replays configured outcomes.
///
/// Unconfigured commands succeed with exit code 0.
#[derive(Default)]
pub struct ScriptedExecutor {
    calls: Mutex<Vec<Call>>,
    failures: HashMap<String, (i32, String)>,
    timeouts: HashSet<String>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a command exit non-zero with the given stderr
    pub fn fail_on(mut self, command: &str, exit_code: i32, stderr: &str) -> Self {
        self.failures
            .insert(command.to_string(), (exit_code, stderr.to_string()));
        self
    }

    /// Make a command exceed its deadline
    pub fn timeout_on(mut self, command: &str) -> Self {
        self.timeouts.insert(command.to_string());
        self
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands executed so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

#[async_trait]
impl RemoteExecutor for ScriptedExecutor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn run(
        &self,
        command: &str,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<ExecOutput, ExecError> {
        self.calls.lock().unwrap().push(Call {
            command: command.to_string(),
            user: identity.user.clone(),
            timeout,
        });

        if self.timeouts.contains(command) {
            return Err(ExecError::TimedOut {
                command: command.to_string(),
                timeout,
            });
        }

        if let Some((exit_code, stderr)) = self.failures.get(command) {
            return Ok(ExecOutput {
                exit_code: *exit_code,
                stdout: String::new(),
                stderr: stderr.clone(),
            });
        }

        Ok(ExecOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Progress store recording every snapshot in memory
#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<Vec<ProgressEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every appended snapshot, in append order
    pub fn snapshots(&self) -> Vec<ProgressEvent> {
        self.snapshots.lock().unwrap().clone()
    }

    /// Latest snapshot per event id, in first-seen order
    pub fn folded(&self) -> Vec<ProgressEvent> {
        let snapshots = self.snapshots();
        let mut order = Vec::new();
        let mut latest: HashMap<uuid::Uuid, ProgressEvent> = HashMap::new();

        for event in snapshots {
            if !latest.contains_key(&event.id) {
                order.push(event.id);
            }
            latest.insert(event.id, event);
        }

        order
            .into_iter()
            .filter_map(|id| latest.remove(&id))
            .collect()
    }

    /// Latest snapshot for a milestone key
    pub fn latest_for(&self, milestone_key: &str) -> Option<ProgressEvent> {
        self.folded()
            .into_iter()
            .find(|e| e.milestone_key == milestone_key)
    }

    /// Count of folded events in a status
    pub fn count_with_status(&self, status: EventStatus) -> usize {
        self.folded().iter().filter(|e| e.status == status).count()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn append(&self, event: &ProgressEvent) -> Result<(), ProgressLogError> {
        self.snapshots.lock().unwrap().push(event.clone());
        Ok(())
    }
}
