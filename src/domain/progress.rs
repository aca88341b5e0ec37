//! Progress events emitted while a run advances through its milestones.
//!
//! Each milestone gets one `ProgressEvent`. Status changes are persisted as
//! append-only JSON snapshots; observers fold the log to the latest snapshot
//! per event id to see the current trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::package::PackageCategory;

/// Persisted record of one milestone's execution status.
///
/// `step_index` counts milestones (1-based), not individual commands;
/// `total_steps` is always the registry's milestone count so observers can
/// render "3 of 7" style progress regardless of how many commands run
/// between markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Unique identifier for this event
    pub id: Uuid,

    /// The run this event belongs to
    pub run_id: Uuid,

    /// Target host of the run
    pub host: String,

    /// Package category being provisioned
    pub category: PackageCategory,

    /// Install or remove
    pub direction: Direction,

    /// Milestone key from the registry
    pub milestone_key: String,

    /// Human-readable milestone label
    pub milestone_label: String,

    /// 1-based milestone position within the run
    pub step_index: u32,

    /// Total milestones in the run (registry count)
    pub total_steps: u32,

    /// Current status
    pub status: EventStatus,

    /// Display text, e.g. "installing: Writing configuration"
    pub detail: String,

    /// Error message if the milestone failed
    pub error: Option<String>,

    /// When the milestone was opened
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

impl ProgressEvent {
    /// Open a new pending event for a milestone
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        run_id: Uuid,
        host: String,
        category: PackageCategory,
        direction: Direction,
        milestone_key: String,
        milestone_label: String,
        step_index: u32,
        total_steps: u32,
    ) -> Self {
        let now = Utc::now();
        let detail = format!("{}: {}", direction.action_label(), milestone_label);

        Self {
            id: Uuid::new_v4(),
            run_id,
            host,
            category,
            direction,
            milestone_key,
            milestone_label,
            step_index,
            total_steps,
            status: EventStatus::Pending,
            detail,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Finalize this event as succeeded
    pub fn succeed(&mut self) {
        self.status = EventStatus::Success;
        self.updated_at = Utc::now();
    }

    /// Finalize this event as failed with diagnostic text
    pub fn fail(&mut self, error: String) {
        self.status = EventStatus::Failed;
        self.error = Some(error);
        self.updated_at = Utc::now();
    }

    /// Whether this event is still open
    pub fn is_pending(&self) -> bool {
        self.status == EventStatus::Pending
    }
}

/// Status of a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Milestone is currently executing
    Pending,

    /// Milestone completed
    Success,

    /// Milestone failed (carries error text)
    Failed,
}

/// Direction of a run: install or remove.
///
/// An explicit tag, passed in at construction; never inferred from types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Install,
    Remove,
}

impl Direction {
    /// Action label used in progress details
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::Install => "installing",
            Self::Remove => "removing",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Remove => write!(f, "remove"),
        }
    }
}
