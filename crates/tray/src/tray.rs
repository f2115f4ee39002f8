//! Tray handle, events, and update types.
//!
//! The actual system tray implementation depends on platform GUI crates.
//! This module defines the channel-based interface the sync core uses to
//! communicate with the tray, independent of the GUI backend.

use std::sync::mpsc;

use crate::menu::{MenuAction, MenuState};
use crate::text::tooltip_text;

/// Configuration for the system tray.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Application name shown in the tooltip.
    pub app_name: String,
    /// Whether auto-start is registered at launch.
    pub installed: bool,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            app_name: "ProxySync".into(),
            installed: false,
        }
    }
}

/// Events emitted by the tray to the sync core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEvent {
    /// "Show Status" clicked, or the icon double-clicked.
    ShowStatus,
    ShowAbout,
    Install,
    Uninstall,
    /// User clicked "Exit" in the context menu.
    QuitRequested,
}

impl From<MenuAction> for TrayEvent {
    fn from(action: MenuAction) -> Self {
        match action {
            MenuAction::ShowStatus => Self::ShowStatus,
            MenuAction::ShowAbout => Self::ShowAbout,
            MenuAction::Install => Self::Install,
            MenuAction::Uninstall => Self::Uninstall,
            MenuAction::Quit => Self::QuitRequested,
        }
    }
}

/// Updates sent from the sync core to the tray.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayUpdate {
    /// New tooltip text.
    Tooltip(String),
    /// Show a balloon notification.
    Notify { title: String, body: String },
    /// Auto-start registration changed; the menu must be rebuilt.
    InstalledChanged(bool),
    /// Request tray shutdown.
    Shutdown,
}

/// Handle for communicating with the system tray from the sync core.
///
/// The tray event loop runs on its own thread and communicates via channels.
pub struct TrayHandle {
    /// Send updates to the tray.
    update_tx: mpsc::Sender<TrayUpdate>,
    /// Receive events from the tray.
    event_rx: mpsc::Receiver<TrayEvent>,
    /// Current menu state.
    state: MenuState,
    /// Last tooltip sent.
    tooltip: String,
}

impl TrayHandle {
    /// Creates a new tray handle with its channel pair.
    ///
    /// Returns `(handle, event_sender, update_receiver)`; the sender and receiver
    /// pair is given to the tray event loop.
    pub fn new(config: TrayConfig) -> (Self, mpsc::Sender<TrayEvent>, mpsc::Receiver<TrayUpdate>) {
        let (update_tx, update_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let tooltip = tooltip_text(&config.app_name, None);
        let handle = Self {
            update_tx,
            event_rx,
            state: MenuState {
                app_name: config.app_name,
                installed: config.installed,
                server: None,
            },
            tooltip,
        };

        (handle, event_tx, update_rx)
    }

    /// Reflects the current server in the tooltip. Sends an update only
    /// when the text changes.
    pub fn set_server(&mut self, server: Option<&str>) {
        self.state.server = server.map(str::to_string);
        let tooltip = tooltip_text(&self.state.app_name, server);
        if tooltip == self.tooltip {
            return;
        }
        self.tooltip.clone_from(&tooltip);
        self.send(TrayUpdate::Tooltip(tooltip));
    }

    /// Shows a balloon notification.
    pub fn notify(&self, title: &str, body: &str) {
        self.send(TrayUpdate::Notify {
            title: title.into(),
            body: body.into(),
        });
    }

    /// Updates the auto-start state.
    pub fn set_installed(&mut self, installed: bool) {
        self.state.installed = installed;
        self.send(TrayUpdate::InstalledChanged(installed));
    }

    /// Requests the tray to shut down.
    pub fn shutdown(&self) {
        self.send(TrayUpdate::Shutdown);
    }

    /// Tries to receive a tray event (non-blocking).
    pub fn try_recv_event(&self) -> Option<TrayEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Returns the current menu state.
    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    fn send(&self, update: TrayUpdate) {
        if self.update_tx.send(update).is_err() {
            tracing::debug!("tray front end is gone, update dropped");
        }
    }
}
