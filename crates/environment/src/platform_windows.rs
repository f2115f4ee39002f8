//! Windows user environment (`HKCU\Environment`) and `WM_SETTINGCHANGE`.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use windows_sys::Win32::Foundation::ERROR_TIMEOUT;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_SETTINGCHANGE,
};
use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE};

use crate::{Broadcaster, EnvironmentError, EnvironmentSink};

const ENVIRONMENT_KEY: &str = "Environment";

/// The persistent per-user environment stored under `HKCU\Environment`.
///
/// The key is opened per operation so the sink holds no OS handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserEnvironment;

impl UserEnvironment {
    /// Checks that the environment key can be opened for writing.
    pub fn open() -> Result<Self, EnvironmentError> {
        open_key()?;
        Ok(Self)
    }
}

fn open_key() -> io::Result<RegKey> {
    RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey_with_flags(ENVIRONMENT_KEY, KEY_QUERY_VALUE | KEY_SET_VALUE)
}

impl EnvironmentSink for UserEnvironment {
    fn set(&self, name: &'static str, value: &str) -> Result<(), EnvironmentError> {
        open_key()
            .and_then(|key| key.set_value(name, &value.to_string()))
            .map_err(|source| EnvironmentError::Write { name, source })
    }

    fn remove(&self, name: &'static str) -> Result<(), EnvironmentError> {
        let key = open_key().map_err(|source| EnvironmentError::Clear { name, source })?;
        match key.delete_value(name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(EnvironmentError::Clear { name, source }),
        }
    }
}

/// Broadcasts `WM_SETTINGCHANGE` with the `"Environment"` section to all
/// top-level windows, skipping hung ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformBroadcaster;

impl Broadcaster for PlatformBroadcaster {
    fn broadcast(&self, timeout: Duration) -> Result<(), EnvironmentError> {
        let section: Vec<u16> = ENVIRONMENT_KEY
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let mut result: usize = 0;

        // SAFETY: `section` is a NUL-terminated UTF-16 buffer that outlives
        // the call, and `result` is a valid out pointer.
        let ret = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                0,
                section.as_ptr() as isize,
                SMTO_ABORTIFHUNG,
                timeout_ms,
                &mut result,
            )
        };

        if ret != 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(ERROR_TIMEOUT as i32) {
            Err(EnvironmentError::BroadcastTimeout)
        } else {
            Err(EnvironmentError::Broadcast(err))
        }
    }
}

/// The user environment sink. `env_file` is ignored on Windows.
pub fn default_sink(env_file: Option<&Path>) -> Result<Arc<dyn EnvironmentSink>, EnvironmentError> {
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "env_file is ignored on Windows");
    }
    Ok(Arc::new(UserEnvironment::open()?))
}
