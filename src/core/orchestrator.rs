//! Orchestrator: drives an ordered step sequence against one remote host.
//!
//! Coordinates command execution, milestone bookkeeping and progress
//! persistence, converting any remote failure into a single
//! `ExecutionError`. Fail-fast: no internal retry, no resume. Retry and
//! backoff belong to the calling job.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Direction, HostRef, Identity, PackageCategory, ProgressEvent};
use crate::exec::RemoteExecutor;

use super::error::ExecutionError;
use super::milestones::MilestoneRegistry;
use super::progress_log::ProgressStore;
use super::step::{EffectOutcome, Plan, Step};

/// Default per-command timeout
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Parameters of one run
#[derive(Debug, Clone)]
pub struct RunSpec {
    /// Identifier correlating progress events with this run
    pub run_id: Uuid,

    /// Target host
    pub host: HostRef,

    /// Package category being provisioned
    pub category: PackageCategory,

    /// Install or remove
    pub direction: Direction,

    /// Remote account commands execute under
    pub identity: Identity,

    /// Per-command deadline
    pub command_timeout: Duration,
}

impl RunSpec {
    pub fn new(
        host: HostRef,
        category: PackageCategory,
        direction: Direction,
        identity: Identity,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            host,
            category,
            direction,
            identity,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Override the per-command timeout
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Pin the run id (the caller opened the progress log first)
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,

    /// All events created by the run, in milestone order, finalized
    pub events: Vec<ProgressEvent>,
}

impl RunReport {
    /// Number of milestones the run passed through
    pub fn milestones_completed(&self) -> usize {
        self.events.len()
    }
}

/// Per-run mutable state.
///
/// Created fresh at the start of each `run()` call and dropped at the end;
/// never instance state, so repeated runs on one orchestrator cannot leak
/// counters or open events into each other.
struct ExecutionContext {
    run_id: Uuid,
    step_counter: u32,
    current: Option<ProgressEvent>,
    closed: Vec<ProgressEvent>,
}

impl ExecutionContext {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            step_counter: 0,
            current: None,
            closed: Vec::new(),
        }
    }

    fn next_index(&mut self) -> u32 {
        self.step_counter += 1;
        self.step_counter
    }
}

/// Drives step sequences through a remote executor and a progress store
pub struct Orchestrator {
    executor: Arc<dyn RemoteExecutor>,
    store: Arc<dyn ProgressStore>,
}

impl Orchestrator {
    pub fn new(executor: Arc<dyn RemoteExecutor>, store: Arc<dyn ProgressStore>) -> Self {
        Self { executor, store }
    }

    /// Execute a step sequence in order, fail-fast.
    ///
    /// Markers close the open progress event and open the next; commands run
    /// remotely under the spec's identity and timeout; effects run locally
    /// and may hand back a command for immediate execution under the same
    /// milestone index.
    #[instrument(
        skip(self, plan, registry),
        fields(run_id = %spec.run_id, host = %spec.host, package = %spec.category, direction = %spec.direction)
    )]
    pub async fn run(
        &self,
        plan: Plan,
        registry: &MilestoneRegistry,
        spec: &RunSpec,
    ) -> Result<RunReport, ExecutionError> {
        info!(steps = plan.len(), milestones = registry.count(), "Starting run");

        let mut ctx = ExecutionContext::new(spec.run_id);

        for step in plan.into_steps() {
            match step {
                Step::Marker(key) => {
                    if let Err(err) = self.open_milestone(&mut ctx, registry, spec, key).await {
                        return Err(self.abort(&mut ctx, err).await);
                    }
                }
                Step::Effect(thunk) => match thunk() {
                    Err(e) => {
                        let err = ExecutionError::Effect {
                            message: e.to_string(),
                        };
                        return Err(self.abort(&mut ctx, err).await);
                    }
                    Ok(EffectOutcome::Command(command)) => {
                        // Runs immediately, under the milestone already open
                        if let Err(err) = self.run_command(&command, spec).await {
                            return Err(self.abort(&mut ctx, err).await);
                        }
                    }
                    Ok(EffectOutcome::Done) => {
                        debug!("Effect step completed locally");
                    }
                },
                Step::Command(command) => {
                    if let Err(err) = self.run_command(&command, spec).await {
                        return Err(self.abort(&mut ctx, err).await);
                    }
                }
            }
        }

        if let Err(err) = self.close_current_success(&mut ctx).await {
            return Err(self.abort(&mut ctx, err).await);
        }

        info!(milestones = ctx.closed.len(), "Run completed");

        Ok(RunReport {
            run_id: ctx.run_id,
            events: ctx.closed,
        })
    }

    /// Close the open milestone (if any) and open the next one
    async fn open_milestone(
        &self,
        ctx: &mut ExecutionContext,
        registry: &MilestoneRegistry,
        spec: &RunSpec,
        key: String,
    ) -> Result<(), ExecutionError> {
        self.close_current_success(ctx).await?;

        let label = match registry.label(&key) {
            Some(label) => label.to_string(),
            None => {
                warn!(%key, "Marker key not in registry, using key as label");
                key.clone()
            }
        };

        let index = ctx.next_index();
        let event = ProgressEvent::open(
            ctx.run_id,
            spec.host.to_string(),
            spec.category,
            spec.direction,
            key,
            label,
            index,
            registry.count(),
        );

        debug!(
            milestone = %event.milestone_key,
            index = event.step_index,
            total = event.total_steps,
            "Opened milestone"
        );

        // The event becomes current even if its snapshot cannot be
        // persisted, so `abort` can still finalize it
        let appended = self.store.append(&event).await;
        ctx.current = Some(event);
        appended.map_err(ExecutionError::Store)
    }

    /// Mark the open milestone succeeded, if one is open.
    ///
    /// The event only leaves `current` once its snapshot is persisted; on a
    /// store failure it stays open for `abort` to finalize.
    async fn close_current_success(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        if let Some(mut event) = ctx.current.take() {
            event.succeed();
            match self.store.append(&event).await {
                Ok(()) => ctx.closed.push(event),
                Err(err) => {
                    ctx.current = Some(event);
                    return Err(ExecutionError::Store(err));
                }
            }
        }
        Ok(())
    }

    /// Run one remote command, classifying non-zero exit and timeout
    async fn run_command(&self, command: &str, spec: &RunSpec) -> Result<(), ExecutionError> {
        debug!(%command, identity = %spec.identity, "Executing remote command");

        let output = self
            .executor
            .run(command, &spec.identity, spec.command_timeout)
            .await
            .map_err(ExecutionError::from_exec)?;

        if !output.success() {
            return Err(ExecutionError::CommandFailed {
                command: command.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(())
    }

    /// Finalize the progress trail after a failure and hand the error back.
    ///
    /// The open event is marked failed with the diagnostic text. Any other
    /// event from this run still pending is marked succeeded; execution is
    /// strictly sequential, so at most one event can be open here.
    /// Persistence errors on this path are logged, never allowed to mask
    /// the original failure.
    async fn abort(&self, ctx: &mut ExecutionContext, err: ExecutionError) -> ExecutionError {
        let diagnostic = err.to_string();
        error!(error = %diagnostic, "Run failed");

        if let Some(mut event) = ctx.current.take() {
            event.fail(diagnostic.clone());
            if let Err(store_err) = self.store.append(&event).await {
                warn!(error = %store_err, "Failed to persist failure event");
            }
            ctx.closed.push(event);
        }

        for event in ctx.closed.iter_mut() {
            if event.is_pending() {
                event.succeed();
                if let Err(store_err) = self.store.append(event).await {
                    warn!(error = %store_err, "Failed to persist stranded event");
                }
            }
        }

        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_spec_defaults() {
        let spec = RunSpec::new(
            HostRef::new("10.0.0.5"),
            PackageCategory::Database,
            Direction::Install,
            Identity::new("root"),
        );

        assert_eq!(spec.command_timeout, Duration::from_secs(300));
        assert_eq!(spec.direction, Direction::Install);
    }

    #[test]
    fn test_run_spec_overrides() {
        let run_id = Uuid::new_v4();
        let spec = RunSpec::new(
            HostRef::new("10.0.0.5"),
            PackageCategory::RepoSync,
            Direction::Remove,
            Identity::new("deploy"),
        )
        .with_command_timeout(Duration::from_secs(30))
        .with_run_id(run_id);

        assert_eq!(spec.command_timeout, Duration::from_secs(30));
        assert_eq!(spec.run_id, run_id);
    }
}
