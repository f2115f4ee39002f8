use std::path::{Path, PathBuf};

use crate::error::{AutostartError, Result};
use crate::{APP_NAME, AutostartBackend};

const DESKTOP_FILE: &str = "proxysync.desktop";

/// XDG autostart entry (`$XDG_CONFIG_HOME/autostart/proxysync.desktop`).
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    dir: PathBuf,
}

impl XdgAutostart {
    /// Uses `dir` as the autostart directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$XDG_CONFIG_HOME/autostart`, falling back to `~/.config/autostart`.
    pub fn for_current_user() -> Result<Self> {
        let config = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .ok_or(AutostartError::NoHomeDir)?,
        };
        Ok(Self::new(config.join("autostart")))
    }

    pub fn entry_path(&self) -> PathBuf {
        self.dir.join(DESKTOP_FILE)
    }
}

fn desktop_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name={APP_NAME}\n\
         Comment=Sync system proxy settings to environment variables\n\
         Exec=\"{}\"\n\
         Terminal=false\n\
         X-GNOME-Autostart-enabled=true\n",
        exe.display()
    )
}

impl AutostartBackend for XdgAutostart {
    fn enable(&self, exe: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| AutostartError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let path = self.entry_path();
        std::fs::write(&path, desktop_entry(exe)).map_err(|e| AutostartError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "wrote autostart entry");
        Ok(())
    }

    fn disable(&self) -> Result<bool> {
        let path = self.entry_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AutostartError::Io { path, source: e }),
        }
    }

    fn is_enabled(&self) -> Result<bool> {
        Ok(self.entry_path().is_file())
    }

    fn name(&self) -> &'static str {
        "xdg-autostart"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_writes_entry_and_disable_removes_it() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = XdgAutostart::new(tmp.path().join("autostart"));
        assert!(!backend.is_enabled().unwrap());

        backend.enable(Path::new("/opt/proxysync/proxysync")).unwrap();
        assert!(backend.is_enabled().unwrap());

        let entry = std::fs::read_to_string(backend.entry_path()).unwrap();
        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("Exec=\"/opt/proxysync/proxysync\"\n"));
        assert!(entry.contains("Name=ProxySync\n"));

        assert!(backend.disable().unwrap());
        assert!(!backend.is_enabled().unwrap());
    }

    #[test]
    fn disable_without_entry_reports_false() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = XdgAutostart::new(tmp.path());
        assert!(!backend.disable().unwrap());
    }

    #[test]
    fn enable_replaces_previous_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = XdgAutostart::new(tmp.path());
        backend.enable(Path::new("/old/proxysync")).unwrap();
        backend.enable(Path::new("/new/proxysync")).unwrap();

        let entry = std::fs::read_to_string(backend.entry_path()).unwrap();
        assert!(entry.contains("/new/proxysync"));
        assert!(!entry.contains("/old/proxysync"));
    }

    #[test]
    fn install_and_uninstall_use_backend() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = XdgAutostart::new(tmp.path());
        crate::install(&backend).unwrap();
        assert!(backend.is_enabled().unwrap());
        assert!(crate::uninstall(&backend).unwrap());
        assert!(!crate::uninstall(&backend).unwrap());
    }
}
