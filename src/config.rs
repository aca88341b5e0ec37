//! Configuration for provis paths and defaults.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PROVIS_HOME)
//! 2. Config file ($PROVIS_HOME/config.yaml)
//! 3. Defaults (~/.provis, ssh, root/deploy identities, 300s timeout)

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::DEFAULT_COMMAND_TIMEOUT;
use crate::domain::IdentityDefaults;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub ssh: SshConfig,
    #[serde(default)]
    pub identities: IdentityConfig,
    pub command_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SshConfig {
    /// Path to the ssh binary
    pub binary: Option<String>,
    /// Options passed as `-o <option>`
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    pub elevated: Option<String>,
    pub app: Option<String>,
}

/// Resolved configuration with absolute paths and defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to provis home (run state)
    pub home: PathBuf,
    /// ssh binary
    pub ssh_binary: String,
    /// ssh `-o` options
    pub ssh_options: Vec<String>,
    /// Default identities per scope
    pub identities: IdentityDefaults,
    /// Per-command timeout
    pub command_timeout: Duration,
}

/// Get the resolved configuration, loading it on first access
pub fn get() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(msg) => anyhow::bail!("Configuration error: {}", msg),
    }
}

/// The provis home directory (PROVIS_HOME or ~/.provis)
pub fn provis_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("PROVIS_HOME") {
        return Ok(PathBuf::from(home));
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".provis"))
}

/// Directory holding per-run progress logs
pub fn runs_dir() -> Result<PathBuf> {
    Ok(provis_home()?.join("runs"))
}

fn load() -> Result<ResolvedConfig> {
    let home = provis_home()?;
    let config_path = home.join("config.yaml");

    let file: ConfigFile = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?
    } else {
        ConfigFile::default()
    };

    let default_identities = IdentityDefaults::default();

    Ok(ResolvedConfig {
        home,
        ssh_binary: file.ssh.binary.unwrap_or_else(|| "ssh".to_string()),
        ssh_options: file.ssh.options.unwrap_or_else(|| {
            vec![
                "BatchMode=yes".to_string(),
                "StrictHostKeyChecking=accept-new".to_string(),
            ]
        }),
        identities: IdentityDefaults {
            elevated: file
                .identities
                .elevated
                .unwrap_or(default_identities.elevated),
            app: file.identities.app.unwrap_or(default_identities.app),
        },
        command_timeout: file
            .command_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT),
    })
}
