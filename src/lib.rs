//! Pothole link: framed serial bridge between a pothole detector host and
//! its microcontroller.
//!
//! The host sends fixed-width ASCII pothole reports and echoes clock-sync
//! frames; the controller pushes clock-sync frames that the host reassembles
//! one byte at a time from an unframed stream with no checksums.
pub mod core;
pub mod link;
pub mod protocol;
pub mod sync;
pub mod time;
pub mod transport;
mod util;

// Re-export commonly used items
pub use crate::core::{
    ClockState, Error, LinkConfig, MalformedFrame, PotholeReport, Result, TimeSyncFrame,
};
pub use crate::link::{Link, StatsSnapshot};
pub use crate::protocol::{encode_report, encode_time_sync, Frame, FrameDecoder};
pub use crate::sync::{Bridge, Listener, ListenerConfig, ListenerExit};
pub use crate::time::SharedClock;
pub use crate::transport::Transport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
