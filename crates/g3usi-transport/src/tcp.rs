use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use tracing::info;

use crate::error::{Result, TransportError};
use crate::traits::UsiStream;

/// TCP binding for a modem exposed through a serial-over-IP bridge.
pub struct TcpLink;

impl TcpLink {
    /// Connect to `addr` (blocking, bounded by `connect_timeout`).
    pub fn connect(
        addr: SocketAddr,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<UsiStream> {
        let stream = TcpStream::connect_timeout(&addr, connect_timeout)
            .map_err(|source| TransportError::Connect { addr, source })?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(read_timeout))?;

        info!(%addr, "connected tcp link");
        Ok(UsiStream::from_tcp(stream))
    }

    /// Wrap an already connected socket (e.g. one accepted by a test fixture).
    pub fn from_stream(stream: TcpStream) -> UsiStream {
        UsiStream::from_tcp(stream)
    }
}
