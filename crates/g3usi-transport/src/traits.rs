use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use serialport::SerialPort;

use crate::error::{Result, TransportError};

/// A connected modem link; implements Read + Write.
///
/// Wraps either a serial port or a TCP stream. Both halves of a host
/// connection are obtained through [`UsiStream::try_clone`].
pub struct UsiStream {
    inner: UsiStreamInner,
}

enum UsiStreamInner {
    Serial(Box<dyn SerialPort>),
    Tcp(TcpStream),
}

impl Read for UsiStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            UsiStreamInner::Serial(port) => port.read(buf),
            UsiStreamInner::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for UsiStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            UsiStreamInner::Serial(port) => port.write(buf),
            UsiStreamInner::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            UsiStreamInner::Serial(port) => port.flush(),
            UsiStreamInner::Tcp(stream) => stream.flush(),
        }
    }
}

impl UsiStream {
    pub(crate) fn from_serial(port: Box<dyn SerialPort>) -> Self {
        Self {
            inner: UsiStreamInner::Serial(port),
        }
    }

    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: UsiStreamInner::Tcp(stream),
        }
    }

    /// Set read timeout on the underlying link.
    ///
    /// Serial ports have no "block forever" mode; `None` maps to one hour.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            UsiStreamInner::Serial(port) => port
                .set_timeout(timeout.unwrap_or(Duration::from_secs(3600)))
                .map_err(|e| TransportError::Io(e.into())),
            UsiStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying link (TCP only; serial shares the read timeout).
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            UsiStreamInner::Serial(_) => Ok(()),
            UsiStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (new handle on the same device or socket).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            UsiStreamInner::Serial(port) => {
                let cloned = port.try_clone().map_err(|e| TransportError::Io(e.into()))?;
                Ok(Self::from_serial(cloned))
            }
            UsiStreamInner::Tcp(stream) => Ok(Self::from_tcp(stream.try_clone()?)),
        }
    }

    /// Number of bytes that can be read without blocking.
    pub fn bytes_to_read(&mut self) -> Result<usize> {
        match &mut self.inner {
            UsiStreamInner::Serial(port) => port
                .bytes_to_read()
                .map(|n| n as usize)
                .map_err(|e| TransportError::Io(e.into())),
            UsiStreamInner::Tcp(stream) => {
                stream.set_nonblocking(true)?;
                let mut buf = [0u8; 2048];
                let result = stream.peek(&mut buf);
                stream.set_nonblocking(false)?;
                match result {
                    Ok(n) => Ok(n),
                    Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Read a single byte, returning `None` when nothing arrived before the read timeout.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.read(&mut byte) {
                Ok(0) => return Err(TransportError::Shutdown),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    return Ok(None)
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Liveness query.
    ///
    /// A TCP peer that has performed an orderly shutdown reads as zero bytes
    /// without blocking; a serial device that disappeared fails `bytes_to_read`.
    pub fn is_connected(&mut self) -> bool {
        match &mut self.inner {
            UsiStreamInner::Serial(port) => port.bytes_to_read().is_ok(),
            UsiStreamInner::Tcp(stream) => {
                if stream.set_nonblocking(true).is_err() {
                    return false;
                }
                let mut probe = [0u8; 1];
                let alive = match stream.peek(&mut probe) {
                    Ok(0) => false,
                    Ok(_) => true,
                    Err(e) => e.kind() == ErrorKind::WouldBlock,
                };
                let _ = stream.set_nonblocking(false);
                alive
            }
        }
    }

    /// Close the link. Blocked readers on other clones observe EOF (TCP) or an error.
    pub fn shutdown(&mut self) -> Result<()> {
        match &mut self.inner {
            UsiStreamInner::Serial(port) => {
                port.clear(serialport::ClearBuffer::All)
                    .map_err(|e| TransportError::Io(e.into()))?;
                Ok(())
            }
            UsiStreamInner::Tcp(stream) => match stream.shutdown(Shutdown::Both) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Link name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            UsiStreamInner::Serial(_) => "serial",
            UsiStreamInner::Tcp(_) => "tcp",
        }
    }
}

impl std::fmt::Debug for UsiStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            UsiStreamInner::Serial(port) => f
                .debug_struct("UsiStream")
                .field("type", &"serial")
                .field("name", &port.name())
                .finish(),
            UsiStreamInner::Tcp(stream) => f
                .debug_struct("UsiStream")
                .field("type", &"tcp")
                .field("peer", &stream.peer_addr().ok())
                .finish(),
        }
    }
}
