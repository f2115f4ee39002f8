//! Fallback settings store for platforms without a per-user proxy registry.

use crate::{RawProxySettings, SettingsError, SettingsStore};

/// Always reports the store as unsupported, which reads as "no proxy".
#[derive(Debug, Default)]
pub struct PlatformSettings;

impl PlatformSettings {
    pub fn new() -> Self {
        Self
    }
}

impl SettingsStore for PlatformSettings {
    fn read_raw(&self) -> Result<RawProxySettings, SettingsError> {
        Err(SettingsError::Unsupported)
    }
}
