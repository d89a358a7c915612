//! Byte-at-a-time reassembly of inbound sync frames.
//!
//! The decoder is a fixed 15-byte buffer plus a cursor. `'@'` always opens a
//! fresh frame; a partial frame it cuts off is reported as dropped. Bytes seen while no
//! frame is open are ignored. When the buffer fills, the last byte must be
//! `'#'`, the header must read `@TS,`, and the ten bytes at offsets 4..=13
//! must all be decimal digits; otherwise the attempt is dropped and the
//! decoder returns to idle. A `'#'` arriving early drops the attempt at once.

use crate::core::{MalformedFrame, TimeSyncFrame};
use crate::util::parse_digits;

use super::{SYNC_FRAME_LEN, SYNC_SENTINEL, SYNC_START, TERMINATOR, TIMESTAMP_DIGITS, TIMESTAMP_OFFSET};

/// Observable decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No frame open
    Idle,
    /// A frame is open with this many bytes buffered (1..15)
    Accumulating(usize),
}

/// State machine for reassembling `@TS,tttttttttt#` frames
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    buffer: [u8; SYNC_FRAME_LEN],
    cursor: usize,
    /// Copy of the last discarded attempt, kept for diagnostics
    discarded: [u8; SYNC_FRAME_LEN],
    discarded_len: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Creates an idle decoder
    pub fn new() -> Self {
        FrameDecoder {
            buffer: [0; SYNC_FRAME_LEN],
            cursor: 0,
            discarded: [0; SYNC_FRAME_LEN],
            discarded_len: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> DecoderState {
        match self.cursor {
            0 => DecoderState::Idle,
            n => DecoderState::Accumulating(n),
        }
    }

    /// Bytes of the frame currently being assembled
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[..self.cursor]
    }

    /// Raw bytes of the most recently dropped attempt
    pub fn discarded(&self) -> &[u8] {
        &self.discarded[..self.discarded_len]
    }

    /// Returns to idle, dropping any partial frame
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.discarded_len = 0;
    }

    /// Feeds a single byte.
    ///
    /// Returns `Ok(Some(frame))` when a frame completes, `Ok(None)` when more
    /// bytes are needed (or the byte was noise), and `Err` when an open frame
    /// had to be dropped. The decoder is idle again after any `Err`, except
    /// for [`MalformedFrame::Restarted`], where the `'@'` that cut the old
    /// frame off has already opened a new one.
    pub fn feed(&mut self, byte: u8) -> Result<Option<TimeSyncFrame>, MalformedFrame> {
        if byte == SYNC_START {
            let cut_off = self.cursor;
            if cut_off > 0 {
                self.discard();
            }
            self.buffer[0] = byte;
            self.cursor = 1;
            return match cut_off {
                0 => Ok(None),
                len => Err(MalformedFrame::Restarted { len }),
            };
        }

        if self.cursor == 0 {
            return Ok(None);
        }

        self.buffer[self.cursor] = byte;
        self.cursor += 1;

        if self.cursor < SYNC_FRAME_LEN {
            if byte == TERMINATOR {
                let len = self.cursor;
                self.discard();
                return Err(MalformedFrame::EarlyTerminator { len });
            }
            return Ok(None);
        }

        self.discard();
        if byte != TERMINATOR {
            return Err(MalformedFrame::MissingTerminator(byte));
        }
        let frame = parse_sync_frame(&self.buffer)?;
        self.discarded_len = 0;
        Ok(Some(frame))
    }

    fn discard(&mut self) {
        self.discarded[..self.cursor].copy_from_slice(&self.buffer[..self.cursor]);
        self.discarded_len = self.cursor;
        self.cursor = 0;
    }
}

/// Validates a complete 15-byte sync frame and extracts its timestamp
pub fn parse_sync_frame(frame: &[u8; SYNC_FRAME_LEN]) -> Result<TimeSyncFrame, MalformedFrame> {
    if frame[1..4] != SYNC_SENTINEL[1..4] {
        return Err(MalformedFrame::BadHeader([frame[1], frame[2], frame[3]]));
    }

    let digits = &frame[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_DIGITS];
    let timestamp_ms = parse_digits(digits).map_err(|(i, byte)| MalformedFrame::NonDigit {
        offset: TIMESTAMP_OFFSET + i,
        byte,
    })?;

    Ok(TimeSyncFrame { timestamp_ms })
}
