use std::path::PathBuf;

/// Auto-start registration errors.
#[derive(Debug, thiserror::Error)]
pub enum AutostartError {
    #[error("cannot determine the current executable")]
    CurrentExe(#[source] std::io::Error),

    #[error("cannot determine home directory")]
    NoHomeDir,

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry error: {0}")]
    Registry(#[source] std::io::Error),

    #[error("auto-start is not supported on this platform")]
    PlatformUnsupported,
}

pub type Result<T> = std::result::Result<T, AutostartError>;
