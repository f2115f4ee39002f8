//! The timer-driven poll-diff-publish loop.

use std::sync::Arc;
use std::time::Duration;

use proxysync_environment::{EnvironmentError, Publisher};
use proxysync_settings::{ConfigReader, ProxyConfiguration};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::ChangeSummary;

/// Default tick interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Shortest accepted tick interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Callback invoked with loop events (change notifications, failures).
pub type ObserverFn = Box<dyn Fn(SyncEvent) + Send + Sync + 'static>;

/// Events reported to the observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A new configuration was published.
    Changed {
        config: ProxyConfiguration,
        summary: ChangeSummary,
        /// Human-readable list of changed fields with their current values.
        message: String,
    },
    /// Writing the environment failed; the change will be retried.
    PublishFailed { error: String },
    /// All proxy variables were cleared on shutdown.
    Cleared,
}

/// Result of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle held the lock; nothing was done.
    Skipped,
    /// The snapshot matched the last published one.
    Unchanged,
    /// The new snapshot was published and committed.
    Published(ChangeSummary),
    /// Publishing failed; the last known snapshot was left untouched.
    Failed(String),
}

#[derive(Debug, Default)]
struct SyncState {
    /// Last successfully published snapshot. `None` before the first publish.
    last_known: Option<ProxyConfiguration>,
}

/// Result of the pure cycle step, before it is applied to the state.
enum Step {
    Unchanged,
    Commit {
        config: ProxyConfiguration,
        summary: ChangeSummary,
    },
    Failed(EnvironmentError),
}

/// Compares `current` with `last_known` and publishes it if it differs.
fn step(
    last_known: Option<&ProxyConfiguration>,
    current: ProxyConfiguration,
    publisher: &Publisher,
) -> Step {
    if last_known == Some(&current) {
        return Step::Unchanged;
    }
    let summary = ChangeSummary::between(last_known, &current);
    match publisher.publish(&current) {
        Ok(_) => Step::Commit {
            config: current,
            summary,
        },
        Err(e) => Step::Failed(e),
    }
}

/// Mirrors the OS proxy settings into the user environment.
///
/// Owns the last published snapshot. Each cycle holds the state lock for its
/// whole duration; the lock is only ever tried, never waited on, by ticks.
pub struct SyncLoop {
    reader: ConfigReader,
    publisher: Publisher,
    state: Mutex<SyncState>,
    observer: Option<ObserverFn>,
    timer: Mutex<Option<CancellationToken>>,
}

impl SyncLoop {
    pub fn new(reader: ConfigReader, publisher: Publisher) -> Self {
        Self {
            reader,
            publisher,
            state: Mutex::new(SyncState::default()),
            observer: None,
            timer: Mutex::new(None),
        }
    }

    /// Sets the callback receiving [`SyncEvent`]s.
    ///
    /// The callback runs after the cycle has released its lock, so it may
    /// call back into the loop (e.g. [`SyncLoop::republish_blocking`]).
    pub fn with_observer(mut self, observer: ObserverFn) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Runs one poll cycle if no other cycle is in progress.
    ///
    /// Blocking: reads the settings store and may write the environment.
    pub fn poll_once(&self) -> CycleOutcome {
        let Ok(mut state) = self.state.try_lock() else {
            tracing::trace!("poll cycle already running, tick dropped");
            return CycleOutcome::Skipped;
        };
        let (outcome, event) = self.run_cycle(&mut state);
        drop(state);
        self.emit(event);
        outcome
    }

    /// Forgets the last published snapshot and runs a cycle, so the current
    /// configuration is published unconditionally.
    ///
    /// Waits for an in-flight cycle. Must not be called from async context.
    pub fn republish_blocking(&self) -> CycleOutcome {
        let mut state = self.state.blocking_lock();
        state.last_known = None;
        let (outcome, event) = self.run_cycle(&mut state);
        drop(state);
        self.emit(event);
        outcome
    }

    /// Async wrapper over [`SyncLoop::republish_blocking`].
    pub async fn republish(self: &Arc<Self>) -> CycleOutcome {
        let this = Arc::clone(self);
        tokio::task::spawn_blocking(move || this.republish_blocking())
            .await
            .unwrap_or_else(|e| CycleOutcome::Failed(e.to_string()))
    }

    /// Fresh read of the settings store, independent of the poll cadence.
    pub fn current_status(&self) -> ProxyConfiguration {
        self.reader.read()
    }

    /// The last published snapshot.
    pub async fn last_known(&self) -> Option<ProxyConfiguration> {
        self.state.lock().await.last_known.clone()
    }

    /// Returns `true` while the timer is active.
    pub async fn is_running(&self) -> bool {
        self.timer.lock().await.is_some()
    }

    /// Publishes the current configuration, then starts polling every
    /// `interval` (clamped to [`MIN_INTERVAL`]).
    ///
    /// Restarts the timer if it is already running.
    pub async fn start(self: &Arc<Self>, interval: Duration) -> CycleOutcome {
        let mut timer = self.timer.lock().await;
        if let Some(cancel) = timer.take() {
            cancel.cancel();
        }

        let interval = interval.max(MIN_INTERVAL);
        let primed = self.republish().await;

        let cancel = CancellationToken::new();
        *timer = Some(cancel.clone());

        let sync = Arc::clone(self);
        tokio::spawn(async move {
            poll_loop(sync, interval, cancel).await;
        });

        tracing::info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "proxy sync started"
        );
        primed
    }

    /// Stops the timer and clears every proxy variable.
    ///
    /// Waits for an in-flight cycle first. The clear happens even if the
    /// loop was never started.
    pub async fn stop(self: &Arc<Self>) -> Result<(), EnvironmentError> {
        if let Some(cancel) = self.timer.lock().await.take() {
            cancel.cancel();
            tracing::info!("proxy sync timer stopped");
        }

        let this = Arc::clone(self);
        tokio::task::spawn_blocking(move || this.clear_blocking())
            .await
            .map_err(|e| EnvironmentError::Io(std::io::Error::other(e)))?
    }

    /// Publishes the disabled configuration and commits it.
    ///
    /// Waits for an in-flight cycle. Must not be called from async context.
    pub fn clear_blocking(&self) -> Result<(), EnvironmentError> {
        let mut state = self.state.blocking_lock();
        let disabled = ProxyConfiguration::disabled();
        if let Err(e) = self.publisher.publish(&disabled) {
            tracing::error!(error = %e, "failed to clear proxy environment");
            return Err(e);
        }
        state.last_known = Some(disabled);
        drop(state);
        tracing::info!("proxy environment cleared");
        self.emit(Some(SyncEvent::Cleared));
        Ok(())
    }

    /// Timer tick: like [`SyncLoop::poll_once`], but a no-op once `cancel`
    /// has fired so a late tick cannot undo the shutdown clear.
    fn poll_tick(&self, cancel: &CancellationToken) -> CycleOutcome {
        let Ok(mut state) = self.state.try_lock() else {
            tracing::trace!("poll cycle already running, tick dropped");
            return CycleOutcome::Skipped;
        };
        if cancel.is_cancelled() {
            return CycleOutcome::Skipped;
        }
        let (outcome, event) = self.run_cycle(&mut state);
        drop(state);
        self.emit(event);
        outcome
    }

    /// Runs one cycle under the caller's lock. The returned event is emitted
    /// by the caller once the lock is released.
    fn run_cycle(&self, state: &mut SyncState) -> (CycleOutcome, Option<SyncEvent>) {
        let current = self.reader.read();
        match step(state.last_known.as_ref(), current, &self.publisher) {
            Step::Unchanged => (CycleOutcome::Unchanged, None),
            Step::Commit { config, summary } => {
                let message = summary.describe(&config);
                tracing::info!(%config, changes = %message.replace('\n', "; "), "proxy settings changed");
                state.last_known = Some(config.clone());
                let event = SyncEvent::Changed {
                    config,
                    summary,
                    message,
                };
                (CycleOutcome::Published(summary), Some(event))
            }
            Step::Failed(e) => {
                tracing::warn!(error = %e, "failed to publish proxy environment, will retry");
                let error = e.to_string();
                let event = SyncEvent::PublishFailed {
                    error: error.clone(),
                };
                (CycleOutcome::Failed(error), Some(event))
            }
        }
    }

    fn emit(&self, event: Option<SyncEvent>) {
        if let (Some(observer), Some(event)) = (&self.observer, event) {
            observer(event);
        }
    }
}

/// Timer loop. Each tick runs on the blocking pool and is not awaited, so a
/// stalled cycle never delays the timer; overlapping ticks are dropped by the
/// state lock.
async fn poll_loop(sync: Arc<SyncLoop>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; start() has just primed.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let sync = Arc::clone(&sync);
                let cancel = cancel.clone();
                tokio::task::spawn_blocking(move || sync.poll_tick(&cancel));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxysync_environment::{MemorySink, NoopBroadcaster, SinkOp};
    use proxysync_settings::{MemorySettings, RawProxySettings};
    use std::sync::Mutex as StdMutex;

    struct Fixture {
        settings: Arc<MemorySettings>,
        sink: Arc<MemorySink>,
        events: Arc<StdMutex<Vec<SyncEvent>>>,
        sync: Arc<SyncLoop>,
    }

    fn fixture(raw: RawProxySettings) -> Fixture {
        let settings = Arc::new(MemorySettings::new(raw));
        let sink = Arc::new(MemorySink::new());
        let events = Arc::new(StdMutex::new(Vec::new()));
        let events2 = Arc::clone(&events);

        let sync = SyncLoop::new(
            ConfigReader::new(settings.clone()),
            Publisher::new(sink.clone(), Arc::new(NoopBroadcaster)),
        )
        .with_observer(Box::new(move |event| {
            events2.lock().unwrap().push(event);
        }));

        Fixture {
            settings,
            sink,
            events,
            sync: Arc::new(sync),
        }
    }

    #[test]
    fn first_poll_publishes_even_when_disabled() {
        let f = fixture(RawProxySettings::default());
        let outcome = f.sync.poll_once();
        assert_eq!(outcome, CycleOutcome::Published(ChangeSummary::all()));
        assert_eq!(f.sink.ops().len(), 7);
        assert!(f.sink.ops().iter().all(|op| matches!(op, SinkOp::Remove(_))));
    }

    #[test]
    fn second_poll_of_same_state_is_noop() {
        let f = fixture(RawProxySettings::enabled("a:80", Some("x")));
        assert!(matches!(f.sync.poll_once(), CycleOutcome::Published(_)));
        f.sink.clear_ops();

        assert_eq!(f.sync.poll_once(), CycleOutcome::Unchanged);
        assert!(f.sink.ops().is_empty());
        assert_eq!(f.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn change_reports_field_summary() {
        let f = fixture(RawProxySettings::enabled("a:80", Some("x")));
        f.sync.poll_once();

        f.settings.set(RawProxySettings::enabled("b:80", Some("x")));
        let outcome = f.sync.poll_once();
        let CycleOutcome::Published(summary) = outcome else {
            panic!("expected publish, got {outcome:?}");
        };
        assert!(summary.server);
        assert!(!summary.enabled);
        assert!(!summary.bypass_list);

        let events = f.events.lock().unwrap();
        match events.last().unwrap() {
            SyncEvent::Changed { message, .. } => assert_eq!(message, "Proxy Server: b:80"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn publish_failure_skips_commit_and_retries() {
        let f = fixture(RawProxySettings::enabled("a:80", None));
        f.sink.fail_on("FTP_PROXY");

        assert!(matches!(f.sync.poll_once(), CycleOutcome::Failed(_)));
        assert!(matches!(
            f.events.lock().unwrap().last(),
            Some(SyncEvent::PublishFailed { .. })
        ));

        // Nothing committed, so the next tick retries the same transition.
        f.sink.heal();
        assert_eq!(
            f.sync.poll_once(),
            CycleOutcome::Published(ChangeSummary::all())
        );
        assert_eq!(f.sink.get("FTP_PROXY").as_deref(), Some("http://a:80"));
    }

    #[test]
    fn republish_ignores_last_known() {
        let f = fixture(RawProxySettings::enabled("a:80", None));
        f.sync.poll_once();
        f.sink.clear_ops();

        assert_eq!(
            f.sync.republish_blocking(),
            CycleOutcome::Published(ChangeSummary::all())
        );
        assert_eq!(f.sink.ops().len(), 7);
    }

    #[test]
    fn current_status_is_a_fresh_read() {
        let f = fixture(RawProxySettings::default());
        f.sync.poll_once();
        f.settings.set(RawProxySettings::enabled("c:3128", None));
        assert_eq!(f.sync.current_status().server(), Some("c:3128"));
    }

    #[test]
    fn cancelled_tick_does_nothing() {
        let f = fixture(RawProxySettings::enabled("a:80", None));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(f.sync.poll_tick(&cancel), CycleOutcome::Skipped);
        assert!(f.sink.ops().is_empty());
    }

    #[test]
    fn observer_may_reenter_the_loop() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::{OnceLock, Weak};

        let sink = Arc::new(MemorySink::new());
        let this: Arc<OnceLock<Weak<SyncLoop>>> = Arc::new(OnceLock::new());
        let reentered = Arc::new(AtomicBool::new(false));
        let observer_this = Arc::clone(&this);
        let observer_reentered = Arc::clone(&reentered);

        let sync = Arc::new(
            SyncLoop::new(
                ConfigReader::new(Arc::new(MemorySettings::new(RawProxySettings::enabled(
                    "a:80", None,
                )))),
                Publisher::new(sink.clone(), Arc::new(NoopBroadcaster)),
            )
            .with_observer(Box::new(move |event| {
                if !matches!(event, SyncEvent::Changed { .. })
                    || observer_reentered.swap(true, Ordering::SeqCst)
                {
                    return;
                }
                let sync = observer_this.get().and_then(Weak::upgrade).unwrap();
                assert_eq!(
                    sync.republish_blocking(),
                    CycleOutcome::Published(ChangeSummary::all())
                );
                sync.clear_blocking().unwrap();
            })),
        );
        this.set(Arc::downgrade(&sync)).unwrap();

        assert_eq!(
            sync.poll_once(),
            CycleOutcome::Published(ChangeSummary::all())
        );
        assert!(reentered.load(Ordering::SeqCst));
        assert!(sink.get("HTTP_PROXY").is_none());
    }

    #[tokio::test]
    async fn stop_clears_and_commits_disabled() {
        let f = fixture(RawProxySettings::enabled("a:80", Some("x")));
        f.sync.republish().await;
        assert!(f.sink.get("HTTP_PROXY").is_some());

        f.sync.stop().await.unwrap();

        for name in proxysync_environment::ALL_VARS {
            assert!(f.sink.get(name).is_none(), "{name} not cleared");
        }
        assert_eq!(
            f.sync.last_known().await,
            Some(ProxyConfiguration::disabled())
        );
        assert_eq!(f.events.lock().unwrap().last(), Some(&SyncEvent::Cleared));
    }

    #[tokio::test]
    async fn start_primes_and_stop_halts_timer() {
        let f = fixture(RawProxySettings::enabled("a:80", None));
        assert!(!f.sync.is_running().await);

        let primed = f.sync.start(Duration::from_millis(100)).await;
        assert_eq!(primed, CycleOutcome::Published(ChangeSummary::all()));
        assert!(f.sync.is_running().await);
        assert_eq!(f.sink.get("PROXY_URL").as_deref(), Some("http://a:80"));

        f.sync.stop().await.unwrap();
        assert!(!f.sync.is_running().await);
    }
}
