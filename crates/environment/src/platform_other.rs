//! Non-Windows user environment: a sourceable env file, no broadcast.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{EnvFileSink, EnvironmentError, EnvironmentSink};

/// No desktop-wide settings-change signal exists here.
pub use crate::NoopBroadcaster as PlatformBroadcaster;

/// Opens the env-file sink at `env_file`, or at the default location
/// (`$XDG_CONFIG_HOME/proxysync/proxy.env`, falling back to `~/.config`).
pub fn default_sink(env_file: Option<&Path>) -> Result<Arc<dyn EnvironmentSink>, EnvironmentError> {
    let path = env_file.map_or_else(default_env_file, Path::to_path_buf);
    tracing::debug!(path = %path.display(), "using env-file sink");
    Ok(Arc::new(EnvFileSink::open(path)?))
}

fn default_env_file() -> PathBuf {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
            PathBuf::from(home).join(".config")
        });
    config_home.join("proxysync").join("proxy.env")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sink_uses_given_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("proxy.env");
        let sink = default_sink(Some(&path)).unwrap();
        sink.set("HTTP_PROXY", "http://a:80").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn default_env_file_is_under_proxysync() {
        let path = default_env_file();
        assert!(path.ends_with("proxysync/proxy.env"));
    }
}
