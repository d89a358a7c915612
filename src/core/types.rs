use serde::{Deserialize, Serialize};

/// A single pothole detection, serialized as soon as it is built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotholeReport {
    /// Controller time of the detection, in milliseconds
    pub timestamp_ms: u64,
    /// Surface area in square inches
    pub area_sqin: f32,
    /// Depth in inches
    pub depth_in: f32,
}

impl PotholeReport {
    /// Creates a new report
    pub fn new(timestamp_ms: u64, area_sqin: f32, depth_in: f32) -> Self {
        PotholeReport {
            timestamp_ms,
            area_sqin,
            depth_in,
        }
    }
}

/// Clock synchronization packet, identical layout in both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSyncFrame {
    /// Controller time in milliseconds (at most 10 decimal digits on the wire)
    pub timestamp_ms: u64,
}

impl TimeSyncFrame {
    /// Creates a new sync frame
    pub fn new(timestamp_ms: u64) -> Self {
        TimeSyncFrame { timestamp_ms }
    }
}

/// Snapshot of the synchronized clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockState {
    /// Last timestamp received from the controller
    pub timestamp_ms: u64,
    /// Whether a sync frame has ever been received
    pub synced: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_state_starts_unsynced() {
        let state = ClockState::default();
        assert_eq!(state.timestamp_ms, 0);
        assert!(!state.synced);
    }

    #[test]
    fn test_report_json_shape() {
        let report = PotholeReport::new(42, 1.5, 0.5);
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["timestamp_ms"], 42);
        assert_eq!(json["area_sqin"], 1.5);
    }
}
