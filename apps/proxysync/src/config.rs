//! Application configuration.
//!
//! Stored as TOML:
//! - Linux: `$XDG_CONFIG_HOME/proxysync/config.toml` (`~/.config` by default)
//! - Windows: `%APPDATA%\proxysync\config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// ProxySync configuration. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Bound on the settings-change broadcast, in milliseconds.
    #[serde(default = "default_broadcast_timeout_ms")]
    pub broadcast_timeout_ms: u64,

    /// Show a notification when the proxy settings change.
    #[serde(default = "default_true")]
    pub notifications: bool,

    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Env file written on hosts without a user environment store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_broadcast_timeout_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            broadcast_timeout_ms: default_broadcast_timeout_ms(),
            notifications: default_true(),
            log_level: default_log_level(),
            env_file: None,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_millis(self.broadcast_timeout_ms)
    }

    /// Loads `path`, or writes the defaults there if it does not exist.
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = toml::from_str(&content).context("invalid configuration")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Returns the platform-specific configuration file path.
pub fn default_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var_os("APPDATA").context("APPDATA is not set")?;
        Ok(PathBuf::from(appdata).join("proxysync").join("config.toml"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home = std::env::var_os("HOME").context("HOME is not set")?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(config_home.join("proxysync").join("config.toml"))
    }
}
