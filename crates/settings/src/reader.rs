//! Settings store seam and the fail-safe reader on top of it.

use std::sync::Arc;

use crate::{ProxyConfiguration, SettingsError};

/// Raw values as found in the settings store. Each one may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProxySettings {
    /// The enable flag, stored as an integer (non-zero means enabled).
    pub enable: Option<u32>,
    pub server: Option<String>,
    pub bypass_list: Option<String>,
}

impl RawProxySettings {
    /// Raw settings for an enabled proxy.
    pub fn enabled(server: impl Into<String>, bypass_list: Option<&str>) -> Self {
        Self {
            enable: Some(1),
            server: Some(server.into()),
            bypass_list: bypass_list.map(str::to_string),
        }
    }
}

/// Read-only access to the OS proxy settings store.
pub trait SettingsStore: Send + Sync {
    /// Fetches the raw values. Must not have side effects.
    fn read_raw(&self) -> Result<RawProxySettings, SettingsError>;
}

/// Produces normalized [`ProxyConfiguration`] snapshots from a store.
#[derive(Clone)]
pub struct ConfigReader {
    store: Arc<dyn SettingsStore>,
}

impl ConfigReader {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Reader over the platform's settings store.
    pub fn platform() -> Self {
        Self::new(Arc::new(crate::PlatformSettings::new()))
    }

    /// Reads the current configuration.
    ///
    /// A missing, unreadable or malformed store reads as disabled.
    pub fn read(&self) -> ProxyConfiguration {
        match self.store.read_raw() {
            Ok(raw) => normalize(raw),
            Err(e) => {
                tracing::debug!(error = %e, "proxy settings unavailable, assuming no proxy");
                ProxyConfiguration::disabled()
            }
        }
    }
}

fn normalize(raw: RawProxySettings) -> ProxyConfiguration {
    let enabled = raw.enable.is_some_and(|v| v != 0);
    ProxyConfiguration::new(enabled, raw.server, raw.bypass_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySettings;

    struct FailingStore;

    impl SettingsStore for FailingStore {
        fn read_raw(&self) -> Result<RawProxySettings, SettingsError> {
            Err(SettingsError::Unavailable(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "key missing",
            )))
        }
    }

    fn reader_over(raw: RawProxySettings) -> ConfigReader {
        ConfigReader::new(Arc::new(MemorySettings::new(raw)))
    }

    #[test]
    fn missing_enable_flag_reads_disabled() {
        let reader = reader_over(RawProxySettings {
            enable: None,
            server: Some("10.0.0.1:8080".into()),
            bypass_list: Some("localhost".into()),
        });
        assert_eq!(reader.read(), ProxyConfiguration::disabled());
    }

    #[test]
    fn zero_enable_flag_discards_values() {
        let reader = reader_over(RawProxySettings {
            enable: Some(0),
            server: Some("10.0.0.1:8080".into()),
            bypass_list: Some("localhost".into()),
        });
        let config = reader.read();
        assert!(!config.is_enabled());
        assert!(config.server().is_none());
        assert!(config.bypass_list().is_none());
    }

    #[test]
    fn enabled_reads_both_values() {
        let reader = reader_over(RawProxySettings::enabled(
            "10.0.0.1:8080",
            Some("localhost;*.local"),
        ));
        let config = reader.read();
        assert!(config.is_enabled());
        assert_eq!(config.server(), Some("10.0.0.1:8080"));
        assert_eq!(config.bypass_list(), Some("localhost;*.local"));
    }

    #[test]
    fn enabled_values_are_independently_optional() {
        let reader = reader_over(RawProxySettings {
            enable: Some(1),
            server: None,
            bypass_list: Some("<local>".into()),
        });
        let config = reader.read();
        assert!(config.is_enabled());
        assert!(config.server().is_none());
        assert_eq!(config.bypass_list(), Some("<local>"));
    }

    #[test]
    fn store_failure_reads_disabled() {
        let reader = ConfigReader::new(Arc::new(FailingStore));
        assert_eq!(reader.read(), ProxyConfiguration::disabled());
    }

    #[test]
    fn any_non_zero_flag_is_enabled() {
        let reader = reader_over(RawProxySettings {
            enable: Some(7),
            server: Some("a:80".into()),
            bypass_list: None,
        });
        assert!(reader.read().is_enabled());
    }
}
