//! System tray interface for ProxySync.
//!
//! Provides the menu model, status texts and a channel-based handle the
//! sync core uses to talk to the tray front end:
//! - [`TrayEvent`]: events from tray to core (e.g. "show status", quit)
//! - [`TrayUpdate`]: updates from core to tray (tooltip, balloon notification)
//!
//! Rendering the icon and menu is left to the front end; it owns the
//! receiving side of the channels and runs on its own thread.

mod menu;
mod text;
mod tray;

pub use menu::{MenuAction, MenuItem, MenuState};
pub use text::{TOOLTIP_MAX_CHARS, about_text, status_text, tooltip_text};
pub use tray::{TrayConfig, TrayEvent, TrayHandle, TrayUpdate};
