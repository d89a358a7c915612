//! Wire protocol
//!
//! Both frame types are fixed-width ASCII with a sentinel prefix and a `#`
//! terminator. There are no checksums and no length bytes; the decoder
//! relies purely on the start byte, the terminator and the fixed length.
//!
//! ```plain
//! report (25 bytes):  $PH,tttttttttt,aaaaa,ddd#
//! sync   (15 bytes):  @TS,tttttttttt#
//! ```
//!
//! `t` is milliseconds, `a` is tenths of a square inch, `d` is tenths of an
//! inch, all zero-padded decimal.

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod message;

pub use self::codec::SyncFrameCodec;
pub use self::decoder::{parse_sync_frame, DecoderState, FrameDecoder};
pub use self::encoder::{encode_report, encode_time_sync};
pub use self::message::{Frame, FrameBytes};

/// Sentinel opening a report frame
pub const REPORT_SENTINEL: &[u8; 4] = b"$PH,";

/// Sentinel opening a sync frame
pub const SYNC_SENTINEL: &[u8; 4] = b"@TS,";

/// Start byte the decoder synchronizes on
pub const SYNC_START: u8 = b'@';

/// Terminator shared by both frame types
pub const TERMINATOR: u8 = b'#';

/// Field separator inside a report frame
pub const SEPARATOR: u8 = b',';

/// Report frame length on the wire
pub const REPORT_FRAME_LEN: usize = 25;

/// Sync frame length on the wire, also the decoder buffer capacity
pub const SYNC_FRAME_LEN: usize = 15;

/// Digits in the timestamp field
pub const TIMESTAMP_DIGITS: usize = 10;

/// Digits in the area field
pub const AREA_DIGITS: usize = 5;

/// Digits in the depth field
pub const DEPTH_DIGITS: usize = 3;

/// Offset of the first timestamp digit in either frame
pub const TIMESTAMP_OFFSET: usize = 4;

/// Saturation limit of the area field, in tenths of a square inch
pub const AREA_MAX_TENTHS: u64 = 99_999;

/// Saturation limit of the depth field, in tenths of an inch
pub const DEPTH_MAX_TENTHS: u64 = 255;

/// Report timestamps are reduced modulo this value
pub const TIMESTAMP_MODULUS: u64 = 10_000_000_000;
