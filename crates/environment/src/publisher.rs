//! Sink and broadcast seams, and the publisher that drives them.

use std::sync::Arc;
use std::time::Duration;

use proxysync_settings::ProxyConfiguration;

use crate::{EnvironmentError, EnvironmentProjection};

/// Default bound on the settings-change broadcast.
const DEFAULT_BROADCAST_TIMEOUT: Duration = Duration::from_secs(1);

/// A user-scoped, persistent environment variable store.
pub trait EnvironmentSink: Send + Sync {
    /// Sets `name` to `value`.
    fn set(&self, name: &'static str, value: &str) -> Result<(), EnvironmentError>;

    /// Removes `name`. Removing a variable that is not set succeeds.
    fn remove(&self, name: &'static str) -> Result<(), EnvironmentError>;
}

/// Tells other running processes that the user environment changed.
pub trait Broadcaster: Send + Sync {
    /// Sends the notification, waiting at most `timeout`.
    fn broadcast(&self, timeout: Duration) -> Result<(), EnvironmentError>;
}

/// A broadcaster that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn broadcast(&self, _timeout: Duration) -> Result<(), EnvironmentError> {
        Ok(())
    }
}

/// Writes projections to a sink and announces them.
#[derive(Clone)]
pub struct Publisher {
    sink: Arc<dyn EnvironmentSink>,
    broadcaster: Arc<dyn Broadcaster>,
    broadcast_timeout: Duration,
}

impl Publisher {
    pub fn new(sink: Arc<dyn EnvironmentSink>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            sink,
            broadcaster,
            broadcast_timeout: DEFAULT_BROADCAST_TIMEOUT,
        }
    }

    /// Sets the bound on the broadcast wait.
    pub fn with_broadcast_timeout(mut self, timeout: Duration) -> Self {
        self.broadcast_timeout = timeout;
        self
    }

    /// Publishes the projection of `config`.
    ///
    /// Stops at the first failed write and returns it without broadcasting.
    /// A failed broadcast is logged and does not fail the publish.
    pub fn publish(
        &self,
        config: &ProxyConfiguration,
    ) -> Result<EnvironmentProjection, EnvironmentError> {
        let projection = EnvironmentProjection::from_config(config);
        self.apply(&projection)?;

        if let Err(e) = self.broadcaster.broadcast(self.broadcast_timeout) {
            tracing::warn!(error = %e, "environment change broadcast failed");
        }

        tracing::debug!(%config, "environment published");
        Ok(projection)
    }

    fn apply(&self, projection: &EnvironmentProjection) -> Result<(), EnvironmentError> {
        for (name, value) in projection.assignments() {
            match value {
                Some(v) => self.sink.set(name, v)?,
                None => self.sink.remove(name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ALL_VARS, MemorySink, SinkOp};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingBroadcaster {
        calls: AtomicU32,
        fail: bool,
    }

    impl Broadcaster for CountingBroadcaster {
        fn broadcast(&self, _timeout: Duration) -> Result<(), EnvironmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EnvironmentError::BroadcastTimeout)
            } else {
                Ok(())
            }
        }
    }

    fn enabled() -> ProxyConfiguration {
        ProxyConfiguration::enabled(
            Some("10.0.0.1:8080".into()),
            Some("localhost;*.local".into()),
        )
    }

    #[test]
    fn publish_writes_projection_and_broadcasts() {
        let sink = Arc::new(MemorySink::new());
        let broadcaster = Arc::new(CountingBroadcaster::default());
        let publisher = Publisher::new(sink.clone(), broadcaster.clone());

        publisher.publish(&enabled()).unwrap();

        assert_eq!(sink.get("PROXY_URL").as_deref(), Some("http://10.0.0.1:8080"));
        assert_eq!(sink.get("NO_PROXY").as_deref(), Some("localhost;*.local"));
        assert_eq!(broadcaster.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn broadcast_failure_is_tolerated() {
        let sink = Arc::new(MemorySink::new());
        let broadcaster = Arc::new(CountingBroadcaster {
            fail: true,
            ..CountingBroadcaster::default()
        });
        let publisher = Publisher::new(sink.clone(), broadcaster);

        assert!(publisher.publish(&enabled()).is_ok());
        assert_eq!(sink.get("HTTP_PROXY").as_deref(), Some("http://10.0.0.1:8080"));
    }

    #[test]
    fn write_failure_aborts_without_broadcast() {
        let sink = Arc::new(MemorySink::new());
        sink.fail_on("HTTPS_PROXY");
        let broadcaster = Arc::new(CountingBroadcaster::default());
        let publisher = Publisher::new(sink.clone(), broadcaster.clone());

        let err = publisher.publish(&enabled()).unwrap_err();
        assert!(err.is_write_failure());
        assert!(matches!(err, EnvironmentError::Write { name: "HTTPS_PROXY", .. }));
        assert_eq!(broadcaster.calls.load(Ordering::SeqCst), 0);
        // Writes before the failing one happened, later ones did not.
        assert!(sink.get("HTTP_PROXY").is_some());
        assert!(sink.get("FTP_PROXY").is_none());
    }

    #[test]
    fn disabled_publish_removes_all_vars() {
        let sink = Arc::new(MemorySink::new());
        let publisher = Publisher::new(sink.clone(), Arc::new(NoopBroadcaster));

        publisher.publish(&enabled()).unwrap();
        sink.clear_ops();
        publisher.publish(&ProxyConfiguration::disabled()).unwrap();

        for name in ALL_VARS {
            assert!(sink.get(name).is_none(), "{name} should be cleared");
        }
        let ops = sink.ops();
        assert_eq!(ops.len(), 7);
        assert!(ops.iter().all(|op| matches!(op, SinkOp::Remove(_))));
    }

    #[test]
    fn timeout_is_configurable() {
        struct Expect(Duration);
        impl Broadcaster for Expect {
            fn broadcast(&self, timeout: Duration) -> Result<(), EnvironmentError> {
                assert_eq!(timeout, self.0);
                Ok(())
            }
        }

        let publisher = Publisher::new(
            Arc::new(MemorySink::new()),
            Arc::new(Expect(Duration::from_millis(250))),
        )
        .with_broadcast_timeout(Duration::from_millis(250));
        publisher.publish(&ProxyConfiguration::disabled()).unwrap();
    }
}
