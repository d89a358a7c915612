use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::{ClockState, Error, Result};
use crate::protocol::TIMESTAMP_MODULUS;

/// High bit of the packed word marks "synced"
const SYNCED_BIT: u64 = 1 << 63;

/// Synchronized controller clock, shared between the listener and reporters.
///
/// The timestamp and the synced flag live in one `AtomicU64`, so a reader
/// always sees a pair that was written together and never blocks. Wire
/// timestamps are at most ten digits, which leaves the top bit free.
#[derive(Debug, Clone, Default)]
pub struct SharedClock {
    word: Arc<AtomicU64>,
}

impl SharedClock {
    /// Creates an unsynced clock at zero
    pub fn new() -> Self {
        SharedClock::default()
    }

    /// Consistent snapshot of the clock
    pub fn snapshot(&self) -> ClockState {
        let word = self.word.load(Ordering::Acquire);
        ClockState {
            timestamp_ms: word & !SYNCED_BIT,
            synced: word & SYNCED_BIT != 0,
        }
    }

    /// Whether any sync frame has been applied
    pub fn is_synced(&self) -> bool {
        self.snapshot().synced
    }

    /// Applies a received sync timestamp and marks the clock synced
    pub(crate) fn update(&self, timestamp_ms: u64) -> Result<ClockState> {
        if timestamp_ms >= TIMESTAMP_MODULUS {
            return Err(Error::FieldOverflow {
                field: "timestamp_ms",
                value: timestamp_ms,
                max: TIMESTAMP_MODULUS - 1,
            });
        }
        self.word.store(timestamp_ms | SYNCED_BIT, Ordering::Release);
        Ok(ClockState {
            timestamp_ms,
            synced: true,
        })
    }
}
