use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for a link, updated from any thread
#[derive(Debug, Default)]
pub struct LinkStats {
    frames_decoded: AtomicU64,
    frames_dropped: AtomicU64,
    reports_sent: AtomicU64,
    echoes_sent: AtomicU64,
    write_failures: AtomicU64,
    read_failures: AtomicU64,
}

/// Point-in-time copy of [`LinkStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Sync frames that completed and were applied
    pub frames_decoded: u64,
    /// Sync frame attempts discarded during resynchronization
    pub frames_dropped: u64,
    pub reports_sent: u64,
    pub echoes_sent: u64,
    pub write_failures: u64,
    pub read_failures: u64,
}

impl LinkStats {
    pub(crate) fn record_decoded(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_report(&self) {
        self.reports_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_echo(&self) {
        self.echoes_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            reports_sent: self.reports_sent.load(Ordering::Relaxed),
            echoes_sent: self.echoes_sent.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
        }
    }
}
