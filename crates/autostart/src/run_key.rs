use std::io;
use std::path::Path;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, KEY_READ, KEY_SET_VALUE};

use crate::AutostartBackend;
use crate::error::{AutostartError, Result};

const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Value under `HKCU\...\CurrentVersion\Run` holding the quoted executable path.
#[derive(Debug, Clone)]
pub struct RunKey {
    value_name: String,
}

impl RunKey {
    pub fn new(value_name: impl Into<String>) -> Self {
        Self {
            value_name: value_name.into(),
        }
    }

    fn open(flags: u32) -> Result<RegKey> {
        RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags(RUN_KEY, flags)
            .map_err(AutostartError::Registry)
    }
}

impl AutostartBackend for RunKey {
    fn enable(&self, exe: &Path) -> Result<()> {
        let (key, _) = RegKey::predef(HKEY_CURRENT_USER)
            .create_subkey(RUN_KEY)
            .map_err(AutostartError::Registry)?;
        let command = format!("\"{}\"", exe.display());
        key.set_value(&self.value_name, &command)
            .map_err(AutostartError::Registry)
    }

    fn disable(&self) -> Result<bool> {
        let key = match Self::open(KEY_SET_VALUE) {
            Ok(key) => key,
            Err(AutostartError::Registry(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        match key.delete_value(&self.value_name) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AutostartError::Registry(e)),
        }
    }

    fn is_enabled(&self) -> Result<bool> {
        let key = match Self::open(KEY_READ) {
            Ok(key) => key,
            Err(AutostartError::Registry(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        match key.get_value::<String, _>(&self.value_name) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AutostartError::Registry(e)),
        }
    }

    fn name(&self) -> &'static str {
        "registry-run-key"
    }
}
