//! Package taxonomy and target host references.
//!
//! Packages fall into a small set of categories (database engine, web
//! server, language runtime, scheduled task, repository sync). The category
//! drives milestone registries and default identity resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a provisionable package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageCategory {
    /// Database engine (MySQL, Postgres, ...)
    Database,

    /// Web server (Nginx, ...)
    WebServer,

    /// Language runtime (PHP, Ruby, Node, ...)
    Runtime,

    /// Scheduled task (cron entry)
    ScheduledTask,

    /// Git repository deployment
    RepoSync,
}

impl PackageCategory {
    /// Whether this category operates on the whole server or a single site
    pub fn scope(&self) -> PackageScope {
        match self {
            Self::Database | Self::WebServer | Self::Runtime | Self::ScheduledTask => {
                PackageScope::Server
            }
            Self::RepoSync => PackageScope::Site,
        }
    }
}

impl fmt::Display for PackageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Database => "database",
            Self::WebServer => "web_server",
            Self::Runtime => "runtime",
            Self::ScheduledTask => "scheduled_task",
            Self::RepoSync => "repo_sync",
        };
        write!(f, "{}", name)
    }
}

/// Scope of a package category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageScope {
    /// Server-wide package, managed under an elevated identity
    Server,

    /// Site-scoped package, managed under the application identity
    Site,
}

/// Lifecycle status of the domain resource a run acts on.
///
/// The calling job owns the pending/in-progress transitions before dispatch;
/// Effect steps flip to `Active` on success and the Remover failure hook
/// flips to `Failed` on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Created, not yet dispatched
    Pending,

    /// Install run in progress
    Installing,

    /// Remove run in progress
    Removing,

    /// Installed and serving
    Active,

    /// A run failed permanently
    Failed,

    /// Removed from the host
    Removed,
}

/// Reference to the target host of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRef {
    /// Hostname or IP address
    pub address: String,

    /// SSH port (None uses the ssh client default)
    pub port: Option<u16>,
}

impl HostRef {
    /// Create a host reference on the default port
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: None,
        }
    }

    /// Create a host reference with an explicit port
    pub fn with_port(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port: Some(port),
        }
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.address, port),
            None => write!(f, "{}", self.address),
        }
    }
}
