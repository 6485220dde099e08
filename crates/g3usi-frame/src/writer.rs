use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use g3usi_transport::UsiStream;
use tracing::trace;

use crate::codec::{encode_frame, max_payload_len, Frame, FrameConfig, MTU};
use crate::error::{FrameError, Result};
use crate::protocol::protocol_name;
use crate::reader::link_error;

/// Frames payloads onto a byte stream, one complete frame per call.
pub struct FrameWriter<T> {
    inner: T,
    scratch: BytesMut,
    max_frame_size: usize,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            // Worst case: every byte escaped, plus both markers.
            scratch: BytesMut::with_capacity(2 * MTU + 2),
            max_frame_size: config.max_frame_size,
        }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.protocol, &frame.payload)
    }

    /// Frame `payload` (command byte first) under `protocol` and transmit it.
    ///
    /// Oversized payloads are refused before any byte reaches the stream.
    pub fn send(&mut self, protocol: u8, payload: &[u8]) -> Result<()> {
        let max = max_payload_len(protocol, self.max_frame_size);
        if payload.len() > max {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max,
            });
        }

        self.scratch.clear();
        encode_frame(protocol, payload, &mut self.scratch)?;
        trace!(
            protocol = protocol_name(protocol),
            wire_len = self.scratch.len(),
            "tx frame"
        );
        write_fully(&mut self.inner, &self.scratch)?;
        retry(|| self.inner.flush())
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }
}

impl FrameWriter<UsiStream> {
    /// Writer over a modem link, with the link's write timeout taken from `config`.
    pub fn with_config_usi(mut inner: UsiStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(link_error)?;
        Ok(Self::with_config(inner, config))
    }
}

/// Write all of `buf`, tolerating short writes and transient errors.
fn write_fully<T: Write>(inner: &mut T, mut buf: &[u8]) -> Result<()> {
    while !buf.is_empty() {
        let n = retry(|| inner.write(buf))?;
        if n == 0 {
            return Err(FrameError::ConnectionClosed);
        }
        buf = &buf[n..];
    }
    Ok(())
}

fn retry<R>(mut op: impl FnMut() -> std::io::Result<R>) -> Result<R> {
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(err) if matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {}
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_frame;
    use crate::protocol::{ADP, MAC};

    /// Accepts at most `chunk` bytes per write and fails the first write and
    /// flush with transient errors.
    #[derive(Default)]
    struct Link {
        chunk: usize,
        writes: usize,
        flushes: usize,
        data: Vec<u8>,
    }

    impl Write for Link {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes += 1;
            match self.writes {
                1 => Err(ErrorKind::Interrupted.into()),
                2 => Err(ErrorKind::WouldBlock.into()),
                _ => {
                    let n = buf.len().min(self.chunk);
                    self.data.extend_from_slice(&buf[..n]);
                    Ok(n)
                }
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            if self.flushes == 1 {
                return Err(ErrorKind::Interrupted.into());
            }
            Ok(())
        }
    }

    #[test]
    fn short_writes_and_transient_errors_still_deliver() {
        let mut writer = FrameWriter::new(Link {
            chunk: 3,
            ..Link::default()
        });
        writer.send(ADP, &[40, 0x7E, 0x7D]).expect("frame should send");

        let link = writer.inner;
        assert_eq!(link.flushes, 2);
        let frame = decode_frame(&link.data).expect("frame should decode");
        assert_eq!(frame.protocol, ADP);
        assert_eq!(frame.payload.as_ref(), &[40, 0x7E, 0x7D]);
    }

    #[test]
    fn write_frame_matches_send() {
        let mut a = FrameWriter::new(Vec::new());
        let mut b = FrameWriter::new(Vec::new());
        a.send(MAC, &[81, 1]).expect("send");
        b.write_frame(&Frame::new(MAC, vec![81, 1]))
            .expect("write_frame");
        assert_eq!(a.get_ref(), b.get_ref());
    }

    #[test]
    fn oversized_payload_writes_nothing() {
        let cfg = FrameConfig {
            max_frame_size: 8,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Vec::new(), cfg);

        let err = writer.send(ADP, b"oversized").expect_err("payload should not fit");
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 4 }));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn zero_length_write_means_closed() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(Closed);
        assert!(matches!(
            writer.send(ADP, &[31]),
            Err(FrameError::ConnectionClosed)
        ));
    }
}
