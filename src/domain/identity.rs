//! Remote identity selection for command execution.
//!
//! The identity a command runs under is a pure function of the package
//! category's scope, with an optional explicit override. Server-scoped
//! packages default to the elevated identity, site-scoped packages to the
//! constrained application identity.

use serde::{Deserialize, Serialize};

use super::package::{PackageCategory, PackageScope};

/// A remote account commands execute under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unix account name on the target host
    pub user: String,
}

impl Identity {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user)
    }
}

/// Default identities per scope, overridable via the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDefaults {
    /// Account for server-scoped packages
    pub elevated: String,

    /// Account for site-scoped packages
    pub app: String,
}

impl Default for IdentityDefaults {
    fn default() -> Self {
        Self {
            elevated: "root".to_string(),
            app: "deploy".to_string(),
        }
    }
}

/// Resolve the identity for a run.
///
/// An explicit override always wins; otherwise the category's scope picks
/// the default.
pub fn resolve_identity(
    category: PackageCategory,
    override_user: Option<&str>,
    defaults: &IdentityDefaults,
) -> Identity {
    if let Some(user) = override_user {
        return Identity::new(user);
    }

    match category.scope() {
        PackageScope::Server => Identity::new(defaults.elevated.clone()),
        PackageScope::Site => Identity::new(defaults.app.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_scoped_defaults_to_elevated() {
        let defaults = IdentityDefaults::default();
        let identity = resolve_identity(PackageCategory::Database, None, &defaults);
        assert_eq!(identity.user, "root");

        let identity = resolve_identity(PackageCategory::ScheduledTask, None, &defaults);
        assert_eq!(identity.user, "root");
    }

    #[test]
    fn test_site_scoped_defaults_to_app_user() {
        let defaults = IdentityDefaults::default();
        let identity = resolve_identity(PackageCategory::RepoSync, None, &defaults);
        assert_eq!(identity.user, "deploy");
    }

    #[test]
    fn test_explicit_override_wins() {
        let defaults = IdentityDefaults::default();
        let identity = resolve_identity(PackageCategory::Database, Some("mysql"), &defaults);
        assert_eq!(identity.user, "mysql");
    }

    #[test]
    fn test_custom_defaults() {
        let defaults = IdentityDefaults {
            elevated: "admin".to_string(),
            app: "www-data".to_string(),
        };
        let identity = resolve_identity(PackageCategory::WebServer, None, &defaults);
        assert_eq!(identity.user, "admin");
    }
}
