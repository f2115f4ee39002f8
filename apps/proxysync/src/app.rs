//! Application orchestrator: wires the sync loop, tray and auto-start together.

use std::sync::{Arc, mpsc};
use std::time::Duration;

use anyhow::Context as _;
use proxysync_autostart::AutostartBackend;
use proxysync_environment::{PlatformBroadcaster, Publisher, default_sink};
use proxysync_settings::ConfigReader;
use proxysync_sync::{SyncEvent, SyncLoop};
use proxysync_tray::{TrayConfig, TrayEvent, TrayHandle, TrayUpdate, about_text, status_text};

use crate::config::Config;

pub const APP_NAME: &str = "ProxySync";

const CHANGED_TITLE: &str = "Proxy Settings Changed";
const STATUS_TITLE: &str = "Proxy Status";

/// How often pending tray events are drained.
const TRAY_POLL: Duration = Duration::from_millis(100);

/// Runs ProxySync until Ctrl-C or a tray quit, then clears the environment.
pub async fn run(config: Config) -> anyhow::Result<()> {
    // -- Sync loop --
    let sink = default_sink(config.env_file.as_deref()).context("opening user environment")?;
    let publisher = Publisher::new(sink, Arc::new(PlatformBroadcaster))
        .with_broadcast_timeout(config.broadcast_timeout());

    let (sync_tx, mut sync_rx) = tokio::sync::mpsc::unbounded_channel();
    let sync = Arc::new(
        SyncLoop::new(ConfigReader::platform(), publisher).with_observer(Box::new(move |event| {
            let _ = sync_tx.send(event);
        })),
    );

    // -- Auto-start --
    let autostart = match proxysync_autostart::platform_backend() {
        Ok(backend) => Some(backend),
        Err(e) => {
            tracing::warn!(error = %e, "auto-start unavailable");
            None
        }
    };
    let installed = autostart
        .as_ref()
        .and_then(|b| b.is_enabled().ok())
        .unwrap_or(false);

    // -- Tray --
    let tray_config = TrayConfig {
        app_name: APP_NAME.into(),
        installed,
    };
    let (tray, _event_tx, update_rx) = TrayHandle::new(tray_config);
    let front_end = std::thread::Builder::new()
        .name("tray".into())
        .spawn(move || headless_front_end(update_rx))?;

    let mut app = App::new(Arc::clone(&sync), tray, autostart, config.notifications);

    // -- Start --
    sync.start(config.poll_interval()).await;
    tracing::info!("ProxySync ready");

    // -- Main loop: wait for shutdown --
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut tray_poll = tokio::time::interval(TRAY_POLL);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("SIGINT received, shutting down");
                break;
            }
            Some(event) = sync_rx.recv() => app.on_sync_event(event),
            _ = tray_poll.tick() => {
                if app.drain_tray_events().await == Flow::Quit {
                    tracing::info!("quit requested via tray");
                    break;
                }
            }
        }
    }

    // -- Graceful shutdown --
    let stopped = sync.stop().await;
    while let Ok(event) = sync_rx.try_recv() {
        app.on_sync_event(event);
    }
    app.tray.shutdown();
    if front_end.join().is_err() {
        tracing::warn!("tray thread panicked");
    }

    stopped.context("clearing proxy environment")
}

/// Whether the main loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Reacts to sync loop events and tray commands.
struct App {
    sync: Arc<SyncLoop>,
    tray: TrayHandle,
    autostart: Option<Box<dyn AutostartBackend>>,
    notifications: bool,
}

impl App {
    fn new(
        sync: Arc<SyncLoop>,
        tray: TrayHandle,
        autostart: Option<Box<dyn AutostartBackend>>,
        notifications: bool,
    ) -> Self {
        Self {
            sync,
            tray,
            autostart,
            notifications,
        }
    }

    fn on_sync_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Changed {
                config, message, ..
            } => {
                self.tray.set_server(config.server());
                if self.notifications {
                    self.tray.notify(CHANGED_TITLE, &message);
                }
            }
            SyncEvent::PublishFailed { error } => {
                tracing::debug!(%error, "publish failure, tray left unchanged");
            }
            SyncEvent::Cleared => self.tray.set_server(None),
        }
    }

    async fn drain_tray_events(&mut self) -> Flow {
        while let Some(event) = self.tray.try_recv_event() {
            if self.on_tray_event(event).await == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    async fn on_tray_event(&mut self, event: TrayEvent) -> Flow {
        tracing::debug!(?event, "tray event");
        match event {
            TrayEvent::ShowStatus => {
                let sync = Arc::clone(&self.sync);
                match tokio::task::spawn_blocking(move || sync.current_status()).await {
                    Ok(current) => self.tray.notify(STATUS_TITLE, &status_text(&current)),
                    Err(e) => tracing::warn!(error = %e, "status read failed"),
                }
            }
            TrayEvent::ShowAbout => {
                let about = about_text(APP_NAME, env!("CARGO_PKG_VERSION"));
                self.tray.notify(&format!("About {APP_NAME}"), &about);
            }
            TrayEvent::Install => self.set_autostart(true),
            TrayEvent::Uninstall => self.set_autostart(false),
            TrayEvent::QuitRequested => return Flow::Quit,
        }
        Flow::Continue
    }

    fn set_autostart(&mut self, enable: bool) {
        let Some(backend) = self.autostart.as_deref() else {
            self.tray
                .notify(APP_NAME, "Auto-start is not supported on this system.");
            return;
        };

        let result = if enable {
            proxysync_autostart::install(backend).map(|()| true)
        } else {
            proxysync_autostart::uninstall(backend).map(|_| false)
        };
        match result {
            Ok(installed) => self.tray.set_installed(installed),
            Err(e) => {
                tracing::warn!(error = %e, enable, "auto-start change failed");
                self.tray.notify(APP_NAME, &format!("Auto-start change failed: {e}"));
            }
        }
    }
}

/// Stand-in for a graphical tray: logs every update until shutdown.
fn headless_front_end(updates: mpsc::Receiver<TrayUpdate>) {
    for update in updates {
        match update {
            TrayUpdate::Tooltip(text) => {
                tracing::debug!(tooltip = %text.replace('\n', " | "), "tray tooltip");
            }
            TrayUpdate::Notify { title, body } => {
                tracing::info!(%title, body = %body.replace('\n', "; "), "notification");
            }
            TrayUpdate::InstalledChanged(installed) => {
                tracing::info!(installed, "auto-start changed");
            }
            TrayUpdate::Shutdown => break,
        }
    }
    tracing::debug!("tray front end stopped");
}
