//! Step definitions: the units of work an orchestrator run executes.
//!
//! A plan is an ordered, immutable sequence of steps. Each step is either a
//! literal remote command, a milestone marker, or a local effect closure.
//! Effects run on the worker, never over the network; an effect may hand
//! back a command string for immediate remote execution.

use std::fmt;

use anyhow::Result;

/// What an effect closure produced
#[derive(Debug)]
pub enum EffectOutcome {
    /// A command to execute remotely, immediately, under the same milestone
    Command(String),

    /// A completed local side effect; nothing to execute
    Done,
}

/// Boxed effect closure, invoked at most once
pub type EffectFn = Box<dyn FnOnce() -> Result<EffectOutcome> + Send>;

/// One unit of work in a run
pub enum Step {
    /// Literal command executed on the remote host
    Command(String),

    /// Milestone marker: closes the open progress event, opens the next
    Marker(String),

    /// Local side-effect closure
    Effect(EffectFn),
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(text) => f.debug_tuple("Command").field(text).finish(),
            Self::Marker(key) => f.debug_tuple("Marker").field(key).finish(),
            Self::Effect(_) => f.write_str("Effect(..)"),
        }
    }
}

/// An ordered step sequence, built once and consumed by one run
#[derive(Debug, Default)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a remote command
    pub fn command(mut self, text: impl Into<String>) -> Self {
        self.steps.push(Step::Command(text.into()));
        self
    }

    /// Append a milestone marker
    pub fn marker(mut self, key: impl Into<String>) -> Self {
        self.steps.push(Step::Marker(key.into()));
        self
    }

    /// Append a local effect closure
    pub fn effect<F>(mut self, thunk: F) -> Self
    where
        F: FnOnce() -> Result<EffectOutcome> + Send + 'static,
    {
        self.steps.push(Step::Effect(Box::new(thunk)));
        self
    }

    /// Append an already-built step
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Consume the plan in execution order
    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}
