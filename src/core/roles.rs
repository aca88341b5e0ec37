//! Role specializations: Installer and Remover.
//!
//! Thin wrappers over the orchestrator selecting the run direction, the
//! default identity convention, and (for removal) a failure hook that flags
//! the domain resource without duplicating orchestrator logic. Roles are
//! built per dispatch and consumed by `execute`.

use std::time::Duration;

use tracing::warn;

use crate::domain::{Direction, HostRef, Identity, PackageCategory};

use super::error::ExecutionError;
use super::milestones::MilestoneRegistry;
use super::orchestrator::{Orchestrator, RunReport, RunSpec, DEFAULT_COMMAND_TIMEOUT};
use super::step::Plan;

/// Hook invoked once with the error text when a removal fails
pub type FailureHook = Box<dyn FnOnce(&str) + Send>;

/// Installs a package on a host
pub struct Installer {
    orchestrator: Orchestrator,
    command_timeout: Duration,
}

impl Installer {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Override the per-command timeout
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Run the install plan. The plan's final effect step conventionally
    /// activates the domain resource.
    pub async fn execute(
        self,
        plan: Plan,
        registry: &MilestoneRegistry,
        host: HostRef,
        category: PackageCategory,
        identity: Identity,
        run_id: uuid::Uuid,
    ) -> Result<RunReport, ExecutionError> {
        let spec = RunSpec::new(host, category, Direction::Install, identity)
            .with_command_timeout(self.command_timeout)
            .with_run_id(run_id);

        self.orchestrator.run(plan, registry, &spec).await
    }
}

/// Removes a package from a host
pub struct Remover {
    orchestrator: Orchestrator,
    command_timeout: Duration,
    on_failure: FailureHook,
}

impl Remover {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            // Default no-op hook
            on_failure: Box::new(|_| {}),
        }
    }

    /// Override the per-command timeout
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Install a hook that flags the domain resource as failed.
    ///
    /// Invoked exactly once, with the raised error's display text, if the
    /// run fails.
    pub fn with_failure_hook(mut self, hook: impl FnOnce(&str) + Send + 'static) -> Self {
        self.on_failure = Box::new(hook);
        self
    }

    /// Run the removal plan. The plan's final effect step conventionally
    /// deletes the domain resource; it only runs if every earlier step
    /// succeeded.
    pub async fn execute(
        self,
        plan: Plan,
        registry: &MilestoneRegistry,
        host: HostRef,
        category: PackageCategory,
        identity: Identity,
        run_id: uuid::Uuid,
    ) -> Result<RunReport, ExecutionError> {
        let spec = RunSpec::new(host, category, Direction::Remove, identity)
            .with_command_timeout(self.command_timeout)
            .with_run_id(run_id);

        match self.orchestrator.run(plan, registry, &spec).await {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!(error = %err, "Removal failed, invoking failure hook");
                (self.on_failure)(&err.to_string());
                Err(err)
            }
        }
    }
}
