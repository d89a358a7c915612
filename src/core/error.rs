use std::fmt;
use std::io;
use thiserror::Error;

/// Reasons an inbound frame attempt was discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedFrame {
    /// Bytes 1..=3 were not `TS,`
    BadHeader([u8; 3]),
    /// Buffer filled up but the last byte was not the terminator
    MissingTerminator(u8),
    /// Terminator seen before the buffer was full
    EarlyTerminator { len: usize },
    /// A byte inside the digit window was not `0`..=`9`
    NonDigit { offset: usize, byte: u8 },
    /// A new `'@'` arrived while `len` bytes of a frame were buffered
    Restarted { len: usize },
}

impl fmt::Display for MalformedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedFrame::BadHeader(h) => {
                write!(f, "bad header {:?}", String::from_utf8_lossy(h))
            }
            MalformedFrame::MissingTerminator(b) => {
                write!(f, "expected '#' at end of frame, got 0x{:02X}", b)
            }
            MalformedFrame::EarlyTerminator { len } => {
                write!(f, "terminator after only {} bytes", len)
            }
            MalformedFrame::NonDigit { offset, byte } => {
                write!(f, "non-digit 0x{:02X} at offset {}", byte, offset)
            }
            MalformedFrame::Restarted { len } => {
                write!(f, "new frame started after {} bytes", len)
            }
        }
    }
}

/// Custom error types for the pothole link
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to open transport {device}: {reason}")]
    TransportOpenFailed { device: String, reason: String },

    #[error("Transport read failed: {0}")]
    TransportReadFailed(String),

    #[error("Transport write failed during {op} ({} bytes {:?}): {reason}", .bytes.len(), String::from_utf8_lossy(.bytes))]
    TransportWriteFailed {
        op: &'static str,
        bytes: Vec<u8>,
        reason: String,
    },

    #[error("Transport closed")]
    TransportClosed,

    /// Frame-level failure lifted into the crate error, for callers that
    /// drive [`FrameDecoder`](crate::protocol::FrameDecoder) themselves and
    /// want to propagate drops with `?`
    #[error("Malformed frame: {0}")]
    MalformedFrame(MalformedFrame),

    #[error("Field {field} value {value} exceeds maximum {max}")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Field {field} has invalid value {value}")]
    InvalidField { field: &'static str, value: f32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport lock poisoned")]
    LockPoisoned,
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new transport open error
    pub fn open_failed(device: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::TransportOpenFailed {
            device: device.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new transport read error
    pub fn read_failed(reason: impl fmt::Display) -> Self {
        Error::TransportReadFailed(reason.to_string())
    }

    /// Creates a new transport write error for the given operation and payload
    pub fn write_failed(op: &'static str, bytes: &[u8], reason: impl fmt::Display) -> Self {
        Error::TransportWriteFailed {
            op,
            bytes: bytes.to_vec(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error ends the listener without being a failure
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::TransportClosed)
    }
}

/// Lets decoder results be propagated with `?` from functions returning [`Result`]
impl From<MalformedFrame> for Error {
    fn from(reason: MalformedFrame) -> Self {
        Error::MalformedFrame(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_names_operation_and_bytes() {
        let err = Error::write_failed("echo", b"@TS,0000001234#", "EIO");
        assert!(matches!(err, Error::TransportWriteFailed { op: "echo", .. }));
        let msg = err.to_string();
        assert!(msg.contains("echo"));
        assert!(msg.contains("@TS,0000001234#"));
        assert!(msg.contains("15 bytes"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));

        let err: Error = MalformedFrame::EarlyTerminator { len: 7 }.into();
        assert_eq!(err.to_string(), "Malformed frame: terminator after only 7 bytes");
    }

    #[test]
    fn test_malformed_frame_propagates_with_question_mark() {
        fn first_frame(bytes: &[u8]) -> Result<Option<u64>> {
            let mut decoder = crate::protocol::FrameDecoder::new();
            for &b in bytes {
                if let Some(frame) = decoder.feed(b)? {
                    return Ok(Some(frame.timestamp_ms));
                }
            }
            Ok(None)
        }

        assert_eq!(first_frame(b"@TS,0000000011#").unwrap(), Some(11));
        let err = first_frame(b"@TS,1@TS,0000000011#").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedFrame(MalformedFrame::Restarted { len: 5 })
        ));
        assert_eq!(err.to_string(), "Malformed frame: new frame started after 5 bytes");
    }

    #[test]
    fn test_closed_detection() {
        assert!(Error::TransportClosed.is_closed());
        assert!(!Error::read_failed("boom").is_closed());
    }
}
