use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::core::{Error, TimeSyncFrame};
use super::decoder::FrameDecoder;
use super::message::Frame;

/// Codec for framing sync packets off an async byte stream.
///
/// Bytes are pulled from the read buffer one at a time through the same
/// [`FrameDecoder`] the polling listener uses, so burst delivery does not
/// change framing behaviour. Malformed frames are dropped and counted.
#[derive(Debug, Clone, Default)]
pub struct SyncFrameCodec {
    decoder: FrameDecoder,
    dropped: u64,
}

impl SyncFrameCodec {
    /// Creates a new sync frame codec
    pub fn new() -> Self {
        SyncFrameCodec::default()
    }

    /// Number of frames dropped as malformed so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Decoder for SyncFrameCodec {
    type Item = TimeSyncFrame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();
            match self.decoder.feed(byte) {
                Ok(Some(frame)) => return Ok(Some(frame)),
                Ok(None) => {}
                Err(reason) => {
                    self.dropped += 1;
                    warn!(
                        %reason,
                        raw = %String::from_utf8_lossy(self.decoder.discarded()),
                        "Dropped malformed sync frame"
                    );
                }
            }
        }
        Ok(None)
    }
}

impl Encoder<Frame> for SyncFrameCodec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = item.encode()?;
        dst.reserve(bytes.len());
        dst.put_slice(bytes.as_bytes());
        Ok(())
    }
}
