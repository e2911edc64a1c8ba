//! Session configuration.
//!
//! Every field has a default, so a partial TOML document (or none at all)
//! yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::file_transfer::CHUNK_SIZE;

/// Errors loading a [`SessionConfig`] from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Timeouts and transfer tuning for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Per-address connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Upper bound on a single readiness wait, in milliseconds.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,

    /// Overall protocol timeout in seconds (defaults to the connect timeout).
    #[serde(default)]
    pub protocol_timeout_secs: Option<u64>,

    /// Largest slice handed to a single channel write during file transfer.
    /// Values above [`CHUNK_SIZE`] are clamped to it.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            wait_timeout_ms: default_wait_timeout(),
            protocol_timeout_secs: None,
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_wait_timeout() -> u64 {
    10_000
}

fn default_chunk_size() -> usize {
    CHUNK_SIZE
}

impl SessionConfig {
    /// Defaults with a specific connect timeout.
    pub fn with_connect_timeout(secs: u64) -> Self {
        Self {
            connect_timeout_secs: secs,
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Protocol timeout in milliseconds, saturated to what libssh2 accepts.
    pub fn protocol_timeout_ms(&self) -> u32 {
        let secs = self.protocol_timeout_secs.unwrap_or(self.connect_timeout_secs);
        u32::try_from(secs.saturating_mul(1000)).unwrap_or(u32::MAX)
    }

    /// Chunk size, between one byte and [`CHUNK_SIZE`].
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.clamp(1, CHUNK_SIZE)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file, returning defaults if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "session config not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded session config");
        Ok(config)
    }
}
