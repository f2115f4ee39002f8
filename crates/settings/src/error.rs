//! Error types for the settings store.

/// Errors produced while reading the raw proxy settings.
///
/// These never escape [`crate::ConfigReader::read`]; they are mapped to the
/// disabled configuration there.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("malformed value for {name}: {reason}")]
    Malformed { name: &'static str, reason: String },

    #[error("no proxy settings store on this platform")]
    Unsupported,
}
