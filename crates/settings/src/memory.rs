//! In-memory settings store backed by a `Mutex`.

use std::sync::Mutex;

use crate::{RawProxySettings, SettingsError, SettingsStore};

/// A [`SettingsStore`] holding its values in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySettings {
    raw: Mutex<RawProxySettings>,
}

impl MemorySettings {
    pub fn new(raw: RawProxySettings) -> Self {
        Self {
            raw: Mutex::new(raw),
        }
    }

    /// Replaces the stored values.
    pub fn set(&self, raw: RawProxySettings) {
        *self.raw.lock().unwrap_or_else(|e| e.into_inner()) = raw;
    }
}

impl SettingsStore for MemorySettings {
    fn read_raw(&self) -> Result<RawProxySettings, SettingsError> {
        Ok(self.raw.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}
