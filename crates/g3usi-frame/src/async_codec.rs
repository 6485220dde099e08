//! `tokio-util` codec over the same framing, for hosts that drive the link
//! from an async runtime.

use std::collections::VecDeque;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, max_payload_len, Frame, MTU};
use crate::error::FrameError;
use crate::reassembler::{Reassembler, ReassemblerStats};

/// Frame codec for `FramedRead` / `FramedWrite`.
#[derive(Debug, Default)]
pub struct UsiCodec {
    reassembler: Reassembler,
    ready: VecDeque<Frame>,
}

impl UsiCodec {
    /// Create a codec bounded by the default MTU.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassembler counters.
    pub fn stats(&self) -> ReassemblerStats {
        self.reassembler.stats()
    }
}

impl Decoder for UsiCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        if !src.is_empty() {
            let chunk = src.split();
            let ready = &mut self.ready;
            self.reassembler.feed(&chunk, |f| ready.push_back(f));
        }
        Ok(self.ready.pop_front())
    }
}

impl Encoder<Frame> for UsiCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        let max = max_payload_len(frame.protocol, MTU);
        if frame.payload.len() > max {
            return Err(FrameError::PayloadTooLarge {
                size: frame.payload.len(),
                max,
            });
        }
        encode_frame(frame.protocol, &frame.payload, dst)
    }
}
