//! Environment projection and publishing for ProxySync.
//!
//! A [`ProxyConfiguration`](proxysync_settings::ProxyConfiguration) is turned
//! into assignments for seven fixed proxy variables, written to a user-scoped
//! [`EnvironmentSink`], and followed by a best-effort [`Broadcaster`] signal
//! so other running programs pick up the change.

mod error;
mod file;
mod memory;
mod projection;
mod publisher;

#[cfg(target_os = "windows")]
#[path = "platform_windows.rs"]
mod platform;

#[cfg(not(target_os = "windows"))]
#[path = "platform_other.rs"]
mod platform;

pub use error::EnvironmentError;
pub use file::EnvFileSink;
pub use memory::{MemorySink, SinkOp};
pub use platform::{PlatformBroadcaster, default_sink};
#[cfg(target_os = "windows")]
pub use platform::UserEnvironment;
pub use projection::{
    ALL_VARS, EnvironmentProjection, NO_PROXY_VARS, PROXY_URL_VARS, canonical_proxy_url,
};
pub use publisher::{Broadcaster, EnvironmentSink, NoopBroadcaster, Publisher};
