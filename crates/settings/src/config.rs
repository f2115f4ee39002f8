//! The normalized proxy configuration value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A snapshot of the per-user proxy configuration.
///
/// Construction normalizes the value: when `enabled` is false, `server` and
/// `bypass_list` are always absent, so two disabled configurations compare
/// equal regardless of what the store held.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SerializedConfiguration")]
pub struct ProxyConfiguration {
    enabled: bool,
    server: Option<String>,
    bypass_list: Option<String>,
}

impl ProxyConfiguration {
    /// The configuration with no proxy.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            server: None,
            bypass_list: None,
        }
    }

    /// An enabled configuration. Blank strings are treated as absent.
    pub fn enabled(server: Option<String>, bypass_list: Option<String>) -> Self {
        Self {
            enabled: true,
            server: non_blank(server),
            bypass_list: non_blank(bypass_list),
        }
    }

    /// Builds a configuration from its three fields, applying normalization.
    pub fn new(enabled: bool, server: Option<String>, bypass_list: Option<String>) -> Self {
        if enabled {
            Self::enabled(server, bypass_list)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The `host:port` endpoint, if enabled and set.
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// The raw override list, if enabled and set.
    pub fn bypass_list(&self) -> Option<&str> {
        self.bypass_list.as_deref()
    }
}

/// Wire shape; deserialized values pass through [`ProxyConfiguration::new`].
#[derive(Deserialize)]
struct SerializedConfiguration {
    enabled: bool,
    #[serde(default)]
    server: Option<String>,
    #[serde(default)]
    bypass_list: Option<String>,
}

impl From<SerializedConfiguration> for ProxyConfiguration {
    fn from(raw: SerializedConfiguration) -> Self {
        Self::new(raw.enabled, raw.server, raw.bypass_list)
    }
}

impl Default for ProxyConfiguration {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Display for ProxyConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return f.write_str("disabled");
        }
        write!(
            f,
            "enabled server={} bypass={}",
            self.server.as_deref().unwrap_or("-"),
            self.bypass_list.as_deref().unwrap_or("-")
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
