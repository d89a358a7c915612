use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::{ClockState, LinkConfig, Result, TimeSyncFrame};
use crate::link::Link;
use crate::protocol::{DecoderState, FrameDecoder};
use crate::time::SharedClock;
use crate::transport::Transport;

/// Listener tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Bounded wait per poll; also the shutdown latency bound
    pub poll_interval: Duration,
    /// Consecutive read failures tolerated before giving up
    pub max_consecutive_read_errors: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        ListenerConfig {
            poll_interval: Duration::from_millis(crate::core::DEFAULT_POLL_INTERVAL_MS),
            max_consecutive_read_errors: 10,
        }
    }
}

impl From<&LinkConfig> for ListenerConfig {
    fn from(config: &LinkConfig) -> Self {
        ListenerConfig {
            poll_interval: config.poll_interval,
            max_consecutive_read_errors: config.max_consecutive_read_errors,
        }
    }
}

/// Why a listener returned normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerExit {
    /// The shutdown token was cancelled
    Shutdown,
    /// The byte source reported end of stream
    SourceClosed,
}

/// Polls the link one byte at a time and applies inbound sync frames.
///
/// Each completed frame updates the shared clock and is echoed back on the
/// same link. Malformed frames are counted and logged, never escalated.
pub struct Listener<T> {
    link: Link<T>,
    clock: SharedClock,
    decoder: FrameDecoder,
    config: ListenerConfig,
    shutdown: CancellationToken,
}

impl<T: Transport> Listener<T> {
    pub fn new(
        link: Link<T>,
        clock: SharedClock,
        config: ListenerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Listener {
            link,
            clock,
            decoder: FrameDecoder::new(),
            config,
            shutdown,
        }
    }

    /// Runs until shutdown, end of stream, or too many read failures.
    ///
    /// Blocks the calling thread; the shutdown token is checked once per
    /// poll, so cancellation is observed within one poll interval.
    pub fn run(&mut self) -> Result<ListenerExit> {
        info!(poll_interval = ?self.config.poll_interval, "Listener started");
        let mut consecutive_errors = 0u32;

        let exit = loop {
            if self.shutdown.is_cancelled() {
                break ListenerExit::Shutdown;
            }

            match self.link.read_byte(self.config.poll_interval) {
                Ok(Some(byte)) => {
                    consecutive_errors = 0;
                    self.handle_byte(byte);
                }
                Ok(None) => consecutive_errors = 0,
                Err(e) if e.is_closed() => break ListenerExit::SourceClosed,
                Err(e) => {
                    consecutive_errors += 1;
                    if consecutive_errors >= self.config.max_consecutive_read_errors {
                        error!(error = %e, consecutive_errors, "Giving up on transport");
                        return Err(e);
                    }
                    warn!(error = %e, consecutive_errors, "Transport read failed");
                    std::thread::sleep(self.config.poll_interval);
                }
            }
        };

        info!(?exit, "Listener stopped");
        Ok(exit)
    }

    /// Feeds one received byte, returning the new clock state if it
    /// completed a sync frame
    pub fn handle_byte(&mut self, byte: u8) -> Option<ClockState> {
        match self.decoder.feed(byte) {
            Ok(Some(frame)) => self.apply(frame),
            Ok(None) => None,
            Err(reason) => {
                self.link.counters().record_dropped();
                warn!(
                    %reason,
                    raw = %String::from_utf8_lossy(self.decoder.discarded()),
                    "Dropped malformed sync frame"
                );
                None
            }
        }
    }

    /// Current decoder state
    pub fn decoder_state(&self) -> DecoderState {
        self.decoder.state()
    }

    fn apply(&mut self, frame: TimeSyncFrame) -> Option<ClockState> {
        let state = match self.clock.update(frame.timestamp_ms) {
            Ok(state) => state,
            Err(e) => {
                self.link.counters().record_dropped();
                warn!(error = %e, "Sync timestamp rejected");
                return None;
            }
        };
        self.link.counters().record_decoded();
        info!(timestamp_ms = state.timestamp_ms, "Time updated");

        // The clock keeps the new value even if the echo cannot be sent
        match self.link.send_echo(frame.timestamp_ms) {
            Ok(bytes) => debug!(frame = %bytes, "Echoed timestamp"),
            Err(e) => warn!(error = %e, "Timestamp echo failed"),
        }
        Some(state)
    }
}
