//! Per-user proxy settings reader for ProxySync.
//!
//! Reads the operating system's proxy settings store and normalizes the raw
//! values into a [`ProxyConfiguration`]. A missing or unreadable store is
//! never an error for callers: it reads as "proxy disabled".

mod config;
mod error;
mod memory;
mod reader;

#[cfg(target_os = "windows")]
#[path = "registry_windows.rs"]
mod platform;

#[cfg(not(target_os = "windows"))]
#[path = "registry_other.rs"]
mod platform;

pub use config::ProxyConfiguration;
pub use error::SettingsError;
pub use memory::MemorySettings;
pub use platform::PlatformSettings;
pub use reader::{ConfigReader, RawProxySettings, SettingsStore};
