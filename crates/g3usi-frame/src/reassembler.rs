use bytes::BytesMut;
use tracing::{debug, trace};

use crate::codec::{decode_unescaped, Frame, ESCAPE, ESCAPE_XOR, FLAG, MTU};
use crate::error::FrameError;

/// Receive state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    /// Waiting for a start marker; everything else is line noise.
    Idle,
    /// Accumulating an escaped frame body.
    InMessage,
    /// The previous byte was an escape prefix.
    InEscape,
}

/// Diagnostic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassemblerStats {
    /// Frames that passed CRC and header checks.
    pub frames: u64,
    /// Frames dropped for a CRC mismatch.
    pub crc_errors: u64,
    /// Frames dropped because the accumulation buffer filled up.
    pub overflows: u64,
    /// Frames dropped for a short or inconsistent header.
    pub malformed: u64,
}

/// Turns a raw byte stream into validated frames.
///
/// Push-style: feed whatever the link produced and receive zero or more
/// frames through the callback. A corrupted frame is dropped and the
/// machine resynchronizes on the next start marker.
#[derive(Debug)]
pub struct Reassembler {
    state: RxState,
    buf: BytesMut,
    max_frame: usize,
    stats: ReassemblerStats,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    /// Create a reassembler bounded by the default MTU.
    pub fn new() -> Self {
        Self::with_max_frame(MTU)
    }

    /// Create a reassembler bounded by `max_frame` unescaped bytes.
    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            state: RxState::Idle,
            buf: BytesMut::with_capacity(max_frame),
            max_frame,
            stats: ReassemblerStats::default(),
        }
    }

    /// Current receive state.
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Counters since creation.
    pub fn stats(&self) -> ReassemblerStats {
        self.stats
    }

    /// Drop any partial frame and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = RxState::Idle;
        self.buf.clear();
    }

    /// Process a whole chunk, handing each valid frame to `on_frame`.
    ///
    /// Returns the number of frames delivered.
    pub fn feed<F: FnMut(Frame)>(&mut self, chunk: &[u8], mut on_frame: F) -> usize {
        trace!(len = chunk.len(), "rx chunk");
        let mut delivered = 0;
        for &byte in chunk {
            if let Some(frame) = self.push(byte) {
                delivered += 1;
                on_frame(frame);
            }
        }
        delivered
    }

    /// Advance the state machine by one byte.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            RxState::Idle => {
                if byte == FLAG {
                    self.buf.clear();
                    self.state = RxState::InMessage;
                }
                None
            }
            RxState::InMessage => match byte {
                ESCAPE => {
                    self.state = RxState::InEscape;
                    None
                }
                FLAG if self.buf.is_empty() => None,
                FLAG => {
                    self.state = RxState::Idle;
                    self.complete()
                }
                _ => {
                    self.append(byte);
                    None
                }
            },
            RxState::InEscape => {
                self.state = RxState::InMessage;
                self.append(byte ^ ESCAPE_XOR);
                None
            }
        }
    }

    fn append(&mut self, byte: u8) {
        if self.buf.len() >= self.max_frame {
            debug!(max = self.max_frame, "rx buffer full, dropping frame");
            self.stats.overflows += 1;
            self.reset();
            return;
        }
        self.buf.extend_from_slice(&[byte]);
    }

    fn complete(&mut self) -> Option<Frame> {
        let raw = self.buf.split();
        match decode_unescaped(&raw) {
            Ok(frame) => {
                self.stats.frames += 1;
                Some(frame)
            }
            Err(err) => {
                match err {
                    FrameError::InvalidCrc { .. } => self.stats.crc_errors += 1,
                    _ => self.stats.malformed += 1,
                }
                debug!(error = %err, len = raw.len(), "dropping frame");
                None
            }
        }
    }
}
