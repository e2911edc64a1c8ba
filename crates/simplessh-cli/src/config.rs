//! Client configuration at `~/.simplessh/config.toml`.
//!
//! Provides default port, username, identity and session tuning.
//! CLI flags always override config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use simplessh_client::SessionConfig;
use std::path::Path;
use tracing::debug;

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default connection settings.
    #[serde(default)]
    pub default: DefaultConfig,

    /// Timeouts and transfer tuning.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Default connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// Default server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Default remote username (empty = local user).
    #[serde(default)]
    pub user: String,

    /// Default private key path (empty = password auth).
    #[serde(default)]
    pub identity: String,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            user: String::new(),
            identity: String::new(),
        }
    }
}

fn default_port() -> u16 {
    22
}

impl Config {
    /// Load configuration from a TOML file, returning defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Default config location (`~/.simplessh/config.toml`).
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|home| home.join(".simplessh").join("config.toml"))
    }
}

/// Parse a `[user@]host` string into `(user, host)`.
///
/// Without an explicit user, `fallback_user` is used, then the current
/// system username.
pub fn parse_target(target: &str, fallback_user: &str) -> Result<(String, String)> {
    if let Some(at_pos) = target.find('@') {
        let user = &target[..at_pos];
        let host = &target[at_pos + 1..];
        if user.is_empty() {
            anyhow::bail!("empty username in target '{target}'");
        }
        if host.is_empty() {
            anyhow::bail!("empty host in target '{target}'");
        }
        Ok((user.to_string(), host.to_string()))
    } else {
        if target.is_empty() {
            anyhow::bail!("empty host");
        }
        let user = if fallback_user.is_empty() {
            std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "root".into())
        } else {
            fallback_user.to_string()
        };
        Ok((user, target.to_string()))
    }
}

/// Parse a `[user@]host:path` destination into `(target, path)`.
pub fn parse_remote_path(destination: &str) -> Result<(String, String)> {
    let colon = destination
        .find(':')
        .with_context(|| format!("destination '{destination}' is not in [user@]host:path form"))?;
    let (target, path) = (&destination[..colon], &destination[colon + 1..]);
    if target.is_empty() {
        anyhow::bail!("empty host in destination '{destination}'");
    }
    if path.is_empty() {
        anyhow::bail!("empty remote path in destination '{destination}'");
    }
    Ok((target.to_string(), path.to_string()))
}
