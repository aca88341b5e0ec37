//! Milestone registries: ordered key -> label mappings per package type.
//!
//! The registry count is the denominator for progress display. The
//! orchestrator is registry-agnostic; it only needs `count()` and label
//! lookup.

use serde::{Deserialize, Serialize};

use crate::domain::PackageCategory;

/// One named checkpoint in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Stable key referenced by marker steps
    pub key: String,

    /// Human-readable label for progress display
    pub label: String,
}

/// Static, ordered mapping of milestone key to display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRegistry {
    entries: Vec<Milestone>,
}

impl MilestoneRegistry {
    pub fn new(entries: Vec<Milestone>) -> Self {
        Self { entries }
    }

    /// Build a registry from (key, label) pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(key, label)| Milestone {
                    key: (*key).to_string(),
                    label: (*label).to_string(),
                })
                .collect(),
        }
    }

    /// Total number of milestones (progress denominator)
    pub fn count(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Look up the label for a key
    pub fn label(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.label.as_str())
    }

    /// Whether a key is declared
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|m| m.key == key)
    }

    /// Milestones in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Milestone> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The standard registry for a package category.
///
/// Blueprints may declare their own labels; these are the defaults.
pub fn standard_registry(category: PackageCategory) -> MilestoneRegistry {
    let pairs: &[(&str, &str)] = match category {
        PackageCategory::Database => &[
            ("prepare", "Preparing system"),
            ("install", "Installing packages"),
            ("configure", "Writing configuration"),
            ("secure", "Securing access"),
            ("finish", "Finishing up"),
        ],
        PackageCategory::WebServer => &[
            ("prepare", "Preparing system"),
            ("install", "Installing packages"),
            ("configure", "Writing configuration"),
            ("enable", "Enabling service"),
            ("finish", "Finishing up"),
        ],
        PackageCategory::Runtime => &[
            ("prepare", "Preparing system"),
            ("install", "Installing runtime"),
            ("link", "Registering binaries"),
            ("finish", "Finishing up"),
        ],
        PackageCategory::ScheduledTask => &[
            ("validate", "Validating schedule"),
            ("install", "Writing crontab entry"),
            ("finish", "Finishing up"),
        ],
        PackageCategory::RepoSync => &[
            ("connect", "Checking repository access"),
            ("clone", "Cloning repository"),
            ("configure", "Configuring deploy hooks"),
            ("finish", "Finishing up"),
        ],
    };

    MilestoneRegistry::from_pairs(pairs)
}
