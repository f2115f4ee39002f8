//! Windows settings store: the `Internet Settings` registry key.

use std::io;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, KEY_READ};
use winreg::types::FromRegValue;

use crate::{RawProxySettings, SettingsError, SettingsStore};

const INTERNET_SETTINGS: &str = r"Software\Microsoft\Windows\CurrentVersion\Internet Settings";

/// Reads `ProxyEnable`, `ProxyServer` and `ProxyOverride` from
/// `HKCU\Software\Microsoft\Windows\CurrentVersion\Internet Settings`.
#[derive(Debug, Default)]
pub struct PlatformSettings;

impl PlatformSettings {
    pub fn new() -> Self {
        Self
    }
}

impl SettingsStore for PlatformSettings {
    fn read_raw(&self) -> Result<RawProxySettings, SettingsError> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let key = hkcu.open_subkey_with_flags(INTERNET_SETTINGS, KEY_READ)?;

        let enable = optional_value::<u32>(&key, "ProxyEnable")?;
        if !enable.is_some_and(|v| v != 0) {
            return Ok(RawProxySettings {
                enable,
                ..RawProxySettings::default()
            });
        }

        Ok(RawProxySettings {
            enable,
            server: optional_value::<String>(&key, "ProxyServer")?,
            bypass_list: optional_value::<String>(&key, "ProxyOverride")?,
        })
    }
}

fn optional_value<T: FromRegValue>(
    key: &RegKey,
    name: &'static str,
) -> Result<Option<T>, SettingsError> {
    match key.get_value::<T, _>(name) {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(SettingsError::Malformed {
            name,
            reason: e.to_string(),
        }),
        Err(e) => Err(SettingsError::Unavailable(e)),
    }
}
