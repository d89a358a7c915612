//! Shared transport handle
//!
//! A [`Link`] is the single critical section around the transport. The
//! listener's one-byte reads and every outbound frame (reports from the
//! reporting path, echoes from the listener) take the same mutex, so frames
//! never interleave on the wire and a half-duplex bus never sees a read and
//! a write at once. Frames are encoded before the lock is taken.

mod stats;

pub use self::stats::{LinkStats, StatsSnapshot};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::core::{Error, PotholeReport, Result, TimeSyncFrame};
use crate::protocol::{Frame, FrameBytes};
use crate::transport::Transport;

/// Cloneable handle to a mutex-guarded transport
pub struct Link<T> {
    transport: Arc<Mutex<T>>,
    stats: Arc<LinkStats>,
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Link {
            transport: Arc::clone(&self.transport),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<T: Transport> Link<T> {
    /// Takes ownership of an opened transport
    pub fn new(transport: T) -> Self {
        Link {
            transport: Arc::new(Mutex::new(transport)),
            stats: Arc::new(LinkStats::default()),
        }
    }

    /// Encodes and transmits one frame as a single write
    pub fn send(&self, frame: Frame) -> Result<FrameBytes> {
        let op = frame.kind();
        let bytes = frame.encode().map_err(|e| {
            warn!(op, error = %e, "Refusing to encode frame");
            e
        })?;

        let result = self.lock()?.write_bytes(bytes.as_bytes());
        if let Err(e) = result {
            self.stats.record_write_failure();
            error!(op, frame = %bytes, error = %e, "Transfer failed");
            return Err(Error::write_failed(op, bytes.as_bytes(), e));
        }

        match frame {
            Frame::Report(_) => self.stats.record_report(),
            Frame::TimeSync(_) => self.stats.record_echo(),
        }
        info!(op, frame = %bytes, "Sent");
        Ok(bytes)
    }

    /// Sends a `$PH` report
    pub fn send_report(&self, report: &PotholeReport) -> Result<FrameBytes> {
        self.send(Frame::Report(*report))
    }

    /// Echoes a sync timestamp back to the controller
    pub fn send_echo(&self, timestamp_ms: u64) -> Result<FrameBytes> {
        self.send(Frame::TimeSync(TimeSyncFrame::new(timestamp_ms)))
    }

    /// Reads at most one byte, waiting up to `timeout`
    pub fn read_byte(&self, timeout: Duration) -> Result<Option<u8>> {
        let result = self.lock()?.read_byte(timeout);
        if let Err(Error::TransportReadFailed(_)) = &result {
            self.stats.record_read_failure();
        }
        result
    }

    /// Runs `f` with exclusive access to the transport
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    /// Current counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn counters(&self) -> &LinkStats {
        &self.stats
    }

    fn lock(&self) -> Result<MutexGuard<'_, T>> {
        self.transport.lock().map_err(|_| Error::LockPoisoned)
    }
}
