use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::{ClockState, LinkConfig, PotholeReport, Result};
use crate::link::{Link, StatsSnapshot};
use crate::protocol::FrameBytes;
use crate::time::SharedClock;
use crate::transport::{self, Transport};

use super::listener::{Listener, ListenerConfig, ListenerExit};

/// Context shared by the listener and the reporting path.
///
/// Owns the link (and through it the transport), the synchronized clock
/// and the shutdown token. Cheap to clone; clones share everything.
pub struct Bridge<T> {
    link: Link<T>,
    clock: SharedClock,
    shutdown: CancellationToken,
    config: ListenerConfig,
}

impl<T> Clone for Bridge<T> {
    fn clone(&self) -> Self {
        Bridge {
            link: self.link.clone(),
            clock: self.clock.clone(),
            shutdown: self.shutdown.clone(),
            config: self.config,
        }
    }
}

impl Bridge<Box<dyn Transport>> {
    /// Opens the configured transport. Failure here is fatal for the caller.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let transport = transport::open(config)?;
        Ok(Bridge::new(transport, ListenerConfig::from(config)))
    }
}

impl<T: Transport + 'static> Bridge<T> {
    pub fn new(transport: T, config: ListenerConfig) -> Self {
        Bridge {
            link: Link::new(transport),
            clock: SharedClock::new(),
            shutdown: CancellationToken::new(),
            config,
        }
    }

    /// Builds a listener bound to this bridge, for callers that manage
    /// their own thread
    pub fn listener(&self) -> Listener<T> {
        Listener::new(
            self.link.clone(),
            self.clock.clone(),
            self.config,
            self.shutdown.clone(),
        )
    }

    /// Runs the listener on tokio's blocking pool
    pub fn spawn_listener(&self) -> JoinHandle<Result<ListenerExit>> {
        let mut listener = self.listener();
        tokio::task::spawn_blocking(move || listener.run())
    }

    /// Sends a fully specified report
    pub fn send_report(&self, report: &PotholeReport) -> Result<FrameBytes> {
        self.link.send_report(report)
    }

    /// Sends a report stamped with the current synchronized time
    pub fn report_detection(&self, area_sqin: f32, depth_in: f32) -> Result<FrameBytes> {
        let now = self.clock.snapshot();
        if !now.synced {
            warn!("Clock not synced yet, report timestamp is {}", now.timestamp_ms);
        }
        self.link
            .send_report(&PotholeReport::new(now.timestamp_ms, area_sqin, depth_in))
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.snapshot()
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn link(&self) -> &Link<T> {
        &self.link
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.link.stats()
    }

    /// Token observed by every listener of this bridge
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Asks running listeners to stop after their current poll
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutdown requested");
            self.shutdown.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Error, TransportKind};
    use crate::transport::MockTransport;
    use std::time::Duration;

    fn config() -> ListenerConfig {
        ListenerConfig {
            poll_interval: Duration::from_millis(1),
            max_consecutive_read_errors: 3,
        }
    }

    #[tokio::test]
    async fn test_spawned_listener_syncs_clock() {
        let bridge = Bridge::new(MockTransport::with_bytes(b"@TS,0000001234#"), config());

        let exit = bridge.spawn_listener().await.unwrap().unwrap();
        assert_eq!(exit, ListenerExit::SourceClosed);
        assert_eq!(bridge.clock_state(), ClockState { timestamp_ms: 1234, synced: true });

        let written = bridge.link().with_transport(|t| t.written_frames()).unwrap();
        assert_eq!(written, vec!["@TS,0000001234#".to_string()]);
    }

    #[tokio::test]
    async fn test_report_detection_uses_synced_time() {
        let bridge = Bridge::new(MockTransport::with_bytes(b"@TS,0000005678#"), config());
        bridge.spawn_listener().await.unwrap().unwrap();

        let bytes = bridge.report_detection(12.3, 1.7).unwrap();
        assert_eq!(bytes.to_string(), "$PH,0000005678,00123,017#");

        let stats = bridge.stats();
        assert_eq!(stats.reports_sent, 1);
        assert_eq!(stats.echoes_sent, 1);
    }

    #[tokio::test]
    async fn test_report_before_sync_uses_zero() {
        let bridge = Bridge::new(MockTransport::new(), config());
        let bytes = bridge.report_detection(1.0, 1.0).unwrap();
        assert_eq!(bytes.to_string(), "$PH,0000000000,00010,010#");
    }

    #[tokio::test]
    async fn test_reports_while_listening() {
        let mut mock = MockTransport::with_bytes(b"@TS,0000000001#");
        mock.stay_open();
        let bridge = Bridge::new(mock, config());
        let handle = bridge.spawn_listener();

        for n in 0..20u64 {
            bridge.send_report(&PotholeReport::new(n, 2.0, 0.3)).unwrap();
            tokio::task::yield_now().await;
        }

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !bridge.clock().is_synced() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        bridge.shutdown();
        assert_eq!(handle.await.unwrap().unwrap(), ListenerExit::Shutdown);

        let written = bridge.link().with_transport(|t| t.written_frames()).unwrap();
        assert_eq!(written.len(), 21);
        assert_eq!(written.iter().filter(|f| f.starts_with("@TS,")).count(), 1);
        assert!(written
            .iter()
            .filter(|f| f.starts_with("$PH,"))
            .all(|f| f.len() == 25 && f.ends_with('#')));
    }

    #[tokio::test]
    async fn test_shutdown_is_shared_by_clones() {
        let mut mock = MockTransport::new();
        mock.stay_open();
        let bridge = Bridge::new(mock, config());
        let other = bridge.clone();
        let handle = bridge.spawn_listener();

        other.shutdown();
        assert!(bridge.shutdown_token().is_cancelled());
        assert_eq!(handle.await.unwrap().unwrap(), ListenerExit::Shutdown);
    }

    #[test]
    fn test_open_reports_missing_device() {
        let config = LinkConfig {
            transport: TransportKind::Serial {
                device: "/nonexistent/ttyS42".to_string(),
                baud_rate: 115_200,
            },
            ..Default::default()
        };
        assert!(matches!(
            Bridge::open(&config),
            Err(Error::TransportOpenFailed { .. })
        ));
    }
}
