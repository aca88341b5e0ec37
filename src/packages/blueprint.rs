//! Package blueprints: external YAML definitions of per-package command
//! lists, grouped by milestone.
//!
//! The orchestrator core never hard-codes a package's commands; blueprints
//! keep them as configuration data. A blueprint compiles into a `Plan`
//! (markers plus commands, in order) and the registry that labels its
//! milestones.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{standard_registry, Milestone, MilestoneRegistry, Plan};
use crate::domain::{Direction, PackageCategory};

/// A package definition loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    /// Package name (e.g. "mysql", "nginx")
    pub name: String,

    /// Package category
    pub category: PackageCategory,

    /// Override the identity resolved from the category scope
    pub identity: Option<String>,

    /// Ordered install milestones
    pub milestones: Vec<BlueprintMilestone>,

    /// Ordered removal milestones (empty if the package is not removable)
    #[serde(default)]
    pub remove_milestones: Vec<BlueprintMilestone>,
}

/// One milestone in a blueprint: a key, an optional display label, and the
/// commands executed under it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintMilestone {
    pub key: String,

    /// Display label; falls back to the category's standard registry,
    /// then to the key itself
    pub label: Option<String>,

    /// Commands executed after this milestone's marker
    #[serde(default)]
    pub commands: Vec<String>,
}

impl Blueprint {
    /// Load a blueprint from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read blueprint file: {}", path.display()))?;

        Self::from_yaml(&content)
    }

    /// Parse a blueprint from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse blueprint YAML")
    }

    /// Validate the blueprint definition
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            anyhow::bail!("Blueprint name cannot be empty");
        }

        if self.milestones.is_empty() {
            anyhow::bail!("Blueprint must declare at least one milestone");
        }

        Self::validate_milestones("milestones", &self.milestones)?;
        if !self.remove_milestones.is_empty() {
            Self::validate_milestones("remove_milestones", &self.remove_milestones)?;
        }

        Ok(())
    }

    fn validate_milestones(section: &str, milestones: &[BlueprintMilestone]) -> Result<()> {
        for (i, milestone) in milestones.iter().enumerate() {
            if milestone.key.is_empty() {
                anyhow::bail!("{}[{}] has an empty key", section, i);
            }

            let duplicate = milestones[..i].iter().any(|m| m.key == milestone.key);
            if duplicate {
                anyhow::bail!("{} declares duplicate key '{}'", section, milestone.key);
            }
        }

        Ok(())
    }

    /// The milestones used for a direction
    fn milestones_for(&self, direction: Direction) -> &[BlueprintMilestone] {
        match direction {
            Direction::Install => &self.milestones,
            Direction::Remove => &self.remove_milestones,
        }
    }

    /// Whether the blueprint declares a removal sequence
    pub fn is_removable(&self) -> bool {
        !self.remove_milestones.is_empty()
    }

    /// The registry labeling this blueprint's milestones for a direction.
    ///
    /// Milestones without a label borrow the one from the category's
    /// standard registry; keys unknown there label as the key itself.
    pub fn registry(&self, direction: Direction) -> MilestoneRegistry {
        let standard = standard_registry(self.category);
        MilestoneRegistry::new(
            self.milestones_for(direction)
                .iter()
                .map(|m| Milestone {
                    key: m.key.clone(),
                    label: m
                        .label
                        .clone()
                        .or_else(|| standard.label(&m.key).map(str::to_string))
                        .unwrap_or_else(|| m.key.clone()),
                })
                .collect(),
        )
    }

    /// Compile the blueprint into an executable plan for a direction
    pub fn plan(&self, direction: Direction) -> Plan {
        let mut plan = Plan::new();
        for milestone in self.milestones_for(direction) {
            plan = plan.marker(milestone.key.clone());
            for command in &milestone.commands {
                plan = plan.command(command.clone());
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Step;

    const TEST_BLUEPRINT_YAML: &str = r#"
name: nginx
category: web_server

milestones:
  - key: prepare
    label: Preparing system
    commands:
      - apt-get update -y
  - key: install
    label: Installing packages
    commands:
      - DEBIAN_FRONTEND=noninteractive apt-get install -y nginx
  - key: enable
    label: Enabling service
    commands:
      - systemctl enable nginx
      - systemctl restart nginx

remove_milestones:
  - key: stop
    label: Stopping service
    commands:
      - systemctl stop nginx || true
  - key: purge
    label: Removing packages
    commands:
      - apt-get purge -y nginx
"#;

    #[test]
    fn test_blueprint_parsing() {
        let blueprint = Blueprint::from_yaml(TEST_BLUEPRINT_YAML).unwrap();

        assert_eq!(blueprint.name, "nginx");
        assert_eq!(blueprint.category, PackageCategory::WebServer);
        assert_eq!(blueprint.milestones.len(), 3);
        assert!(blueprint.is_removable());
        assert!(blueprint.validate().is_ok());
    }

    #[test]
    fn test_registry_per_direction() {
        let blueprint = Blueprint::from_yaml(TEST_BLUEPRINT_YAML).unwrap();

        let install = blueprint.registry(Direction::Install);
        assert_eq!(install.count(), 3);
        assert_eq!(install.label("enable"), Some("Enabling service"));

        let remove = blueprint.registry(Direction::Remove);
        assert_eq!(remove.count(), 2);
        assert_eq!(remove.label("stop"), Some("Stopping service"));
    }

    #[test]
    fn test_plan_interleaves_markers_and_commands() {
        let blueprint = Blueprint::from_yaml(TEST_BLUEPRINT_YAML).unwrap();
        let steps = blueprint.plan(Direction::Install).into_steps();

        // marker, cmd, marker, cmd, marker, cmd, cmd
        assert_eq!(steps.len(), 7);
        assert!(matches!(&steps[0], Step::Marker(k) if k == "prepare"));
        assert!(matches!(&steps[1], Step::Command(c) if c == "apt-get update -y"));
        assert!(matches!(&steps[4], Step::Marker(k) if k == "enable"));
        assert!(matches!(&steps[6], Step::Command(c) if c == "systemctl restart nginx"));
    }

    #[test]
    fn test_omitted_labels_fall_back_to_standard_registry() {
        let yaml = r#"
name: mysql
category: database
milestones:
  - key: prepare
    commands:
      - apt-get update -y
  - key: secure
    commands:
      - mysql_secure_installation
  - key: replicate
    label: Configuring replication
    commands:
      - mysql -e "CHANGE MASTER TO ..."
  - key: snapshot
    commands:
      - mysqldump --all-databases > /backup/initial.sql
"#;
        let blueprint = Blueprint::from_yaml(yaml).unwrap();
        assert!(blueprint.validate().is_ok());

        let registry = blueprint.registry(Direction::Install);
        // Standard labels fill in for omitted ones
        assert_eq!(registry.label("prepare"), Some("Preparing system"));
        assert_eq!(registry.label("secure"), Some("Securing access"));
        // An explicit label always wins
        assert_eq!(registry.label("replicate"), Some("Configuring replication"));
        // Keys unknown to the standard registry label as themselves
        assert_eq!(registry.label("snapshot"), Some("snapshot"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let yaml = r#"
name: broken
category: database
milestones:
  - key: install
    label: First
  - key: install
    label: Second
"#;
        let blueprint = Blueprint::from_yaml(yaml).unwrap();
        let err = blueprint.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate key 'install'"));
    }

    #[test]
    fn test_empty_milestones_rejected() {
        let yaml = r#"
name: empty
category: database
milestones: []
"#;
        let blueprint = Blueprint::from_yaml(yaml).unwrap();
        assert!(blueprint.validate().is_err());
    }
}
