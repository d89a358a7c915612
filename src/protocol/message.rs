use std::fmt;

use crate::core::{PotholeReport, Result, TimeSyncFrame};
use super::encoder::{encode_report, encode_time_sync};
use super::{REPORT_FRAME_LEN, SYNC_FRAME_LEN};

/// Outbound frames the host can put on the wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// Pothole detection report (`$PH,...#`)
    Report(PotholeReport),
    /// Clock sync echo (`@TS,...#`)
    TimeSync(TimeSyncFrame),
}

impl Frame {
    /// Short name used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Report(_) => "report",
            Frame::TimeSync(_) => "echo",
        }
    }

    /// Encodes the frame into its fixed-width wire form
    pub fn encode(&self) -> Result<FrameBytes> {
        let mut bytes = FrameBytes {
            buf: [0; REPORT_FRAME_LEN],
            len: 0,
        };
        match self {
            Frame::Report(report) => {
                bytes.buf = encode_report(report)?;
                bytes.len = REPORT_FRAME_LEN;
            }
            Frame::TimeSync(sync) => {
                bytes.buf[..SYNC_FRAME_LEN].copy_from_slice(&encode_time_sync(sync)?);
                bytes.len = SYNC_FRAME_LEN;
            }
        }
        Ok(bytes)
    }
}

impl From<PotholeReport> for Frame {
    fn from(report: PotholeReport) -> Self {
        Frame::Report(report)
    }
}

impl From<TimeSyncFrame> for Frame {
    fn from(sync: TimeSyncFrame) -> Self {
        Frame::TimeSync(sync)
    }
}

/// An encoded frame, stored inline
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FrameBytes {
    buf: [u8; REPORT_FRAME_LEN],
    len: usize,
}

impl FrameBytes {
    /// Wire bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for FrameBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Frames are pure ASCII, so they print as text
impl fmt::Display for FrameBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.as_bytes() {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FrameBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameBytes({:?})", self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_lengths() {
        let report = Frame::from(PotholeReport::new(1234567890, 12.3, 1.7)).encode().unwrap();
        assert_eq!(report.len(), REPORT_FRAME_LEN);
        assert_eq!(report.to_string(), "$PH,1234567890,00123,017#");

        let echo = Frame::from(TimeSyncFrame::new(1234)).encode().unwrap();
        assert_eq!(echo.len(), SYNC_FRAME_LEN);
        assert_eq!(echo.as_bytes(), b"@TS,0000001234#");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Frame::TimeSync(TimeSyncFrame::new(0)).kind(), "echo");
        assert_eq!(Frame::Report(PotholeReport::new(0, 0.0, 0.0)).kind(), "report");
    }

    #[test]
    fn test_encode_errors_propagate() {
        assert!(Frame::from(TimeSyncFrame::new(u64::MAX)).encode().is_err());
        assert!(Frame::from(PotholeReport::new(0, -1.0, 0.0)).encode().is_err());
    }
}
