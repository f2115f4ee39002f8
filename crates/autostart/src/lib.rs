//! Per-user auto-start registration.
//!
//! - Windows: a value under `HKCU\Software\Microsoft\Windows\CurrentVersion\Run`
//! - Linux: an XDG autostart entry in `~/.config/autostart`
//! - Elsewhere: [`AutostartError::PlatformUnsupported`]

mod error;
mod xdg;

#[cfg(target_os = "windows")]
mod run_key;

use std::path::Path;

pub use error::{AutostartError, Result};
pub use xdg::XdgAutostart;
#[cfg(target_os = "windows")]
pub use run_key::RunKey;

/// Name the registration is stored under.
pub const APP_NAME: &str = "ProxySync";

/// A place where the executable can be registered to start at login.
pub trait AutostartBackend: Send + Sync {
    /// Registers `exe` to start at login, replacing any previous entry.
    fn enable(&self, exe: &Path) -> Result<()>;

    /// Removes the registration. Returns `false` if there was none.
    fn disable(&self) -> Result<bool>;

    fn is_enabled(&self) -> Result<bool>;

    /// Short backend name for messages.
    fn name(&self) -> &'static str;
}

/// The backend for the current platform.
pub fn platform_backend() -> Result<Box<dyn AutostartBackend>> {
    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(RunKey::new(APP_NAME)))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(XdgAutostart::for_current_user()?))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    {
        Err(AutostartError::PlatformUnsupported)
    }
}

/// Registers the running executable.
pub fn install(backend: &dyn AutostartBackend) -> Result<()> {
    let exe = std::env::current_exe().map_err(AutostartError::CurrentExe)?;
    backend.enable(&exe)?;
    tracing::info!(backend = backend.name(), exe = %exe.display(), "auto-start enabled");
    Ok(())
}

/// Removes the registration. Returns `false` if there was none.
pub fn uninstall(backend: &dyn AutostartBackend) -> Result<bool> {
    let removed = backend.disable()?;
    if removed {
        tracing::info!(backend = backend.name(), "auto-start disabled");
    } else {
        tracing::info!(backend = backend.name(), "auto-start was not enabled");
    }
    Ok(removed)
}
