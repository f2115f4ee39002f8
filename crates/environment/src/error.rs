//! Error types for environment publishing.

/// Errors produced while writing variables or broadcasting the change.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("failed to set {name}: {source}")]
    Write {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to clear {name}: {source}")]
    Clear {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("settings-change broadcast failed: {0}")]
    Broadcast(#[source] std::io::Error),

    #[error("settings-change broadcast timed out")]
    BroadcastTimeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvironmentError {
    /// Whether the error came from the variable-write phase.
    ///
    /// Write-phase failures abort the cycle's commit; broadcast failures do not.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::Clear { .. } | Self::Io(_))
    }
}
