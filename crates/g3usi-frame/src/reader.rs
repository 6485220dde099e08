use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use g3usi_transport::{TransportError, UsiStream};
use tracing::trace;

use crate::codec::{Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::reassembler::{Reassembler, ReassemblerStats};

/// Bytes requested from the link per read.
const READ_CHUNK: usize = 512;

/// Pulls validated frames out of a byte stream.
///
/// Corrupted or oversized frames are dropped by the reassembler and counted
/// in [`stats`](Self::stats); only frames whose CRC validated come out.
pub struct FrameReader<T> {
    inner: T,
    reassembler: Reassembler,
    ready: VecDeque<Frame>,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            reassembler: Reassembler::with_max_frame(config.max_frame_size),
            ready: VecDeque::new(),
        }
    }

    /// Block until a frame is available.
    ///
    /// Read timeouts on the link are retried. End of stream, even in the
    /// middle of a frame, is [`FrameError::ConnectionClosed`].
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }
            self.fill()?;
        }
    }

    /// Read once and hand every completed frame to `on_frame`, in order.
    ///
    /// Frames queued by an earlier [`read_frame`](Self::read_frame) go first.
    /// Returns how many frames were delivered; `Ok(0)` after a read timeout,
    /// so a caller can re-check its deadline.
    pub fn pump<F: FnMut(Frame)>(&mut self, mut on_frame: F) -> Result<usize> {
        if self.ready.is_empty() {
            self.fill()?;
        }
        let delivered = self.ready.len();
        self.ready.drain(..).for_each(&mut on_frame);
        Ok(delivered)
    }

    pub fn stats(&self) -> ReassemblerStats {
        self.reassembler.stats()
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// One read from the link; completed frames are queued.
    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => break n,
                Err(err) => match err.kind() {
                    ErrorKind::Interrupted => continue,
                    ErrorKind::WouldBlock | ErrorKind::TimedOut => return Ok(()),
                    _ => return Err(FrameError::Io(err)),
                },
            }
        };
        trace!(len = n, "rx chunk");
        let ready = &mut self.ready;
        self.reassembler.feed(&chunk[..n], |frame| ready.push_back(frame));
        Ok(())
    }
}

impl FrameReader<UsiStream> {
    /// Reader over a modem link, with the link's read timeout taken from `config`.
    pub fn with_config_usi(mut inner: UsiStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(link_error)?;
        Ok(Self::with_config(inner, config))
    }
}

/// Fold a link setup failure into the framing error space.
pub(crate) fn link_error(err: TransportError) -> FrameError {
    match err {
        TransportError::Io(source)
        | TransportError::Open { source, .. }
        | TransportError::Connect { source, .. } => FrameError::Io(source),
        TransportError::Shutdown => FrameError::ConnectionClosed,
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
