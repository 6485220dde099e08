use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::serial::SerialLink;
use crate::tcp::TcpLink;
use crate::traits::UsiStream;

/// Default baud rate for a directly attached modem.
pub const DEFAULT_BAUD_RATE: u32 = 230_400;

/// Default TCP port of serial-over-IP bridges.
pub const DEFAULT_TCP_PORT: u16 = 5000;

/// Where the modem is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// TTY device path and baud rate.
    Serial { path: String, baud_rate: u32 },
    /// TCP socket address.
    Tcp(SocketAddr),
}

impl Endpoint {
    /// Select the binding from the endpoint string.
    ///
    /// An IPv4 address (optionally `addr:port`) selects TCP; anything else is a
    /// TTY path.
    pub fn parse(endpoint: &str, baud_rate: u32, tcp_port: u16) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(TransportError::InvalidEndpoint(endpoint.to_string()));
        }
        if let Ok(ip) = endpoint.parse::<Ipv4Addr>() {
            return Ok(Self::Tcp(SocketAddr::V4(SocketAddrV4::new(ip, tcp_port))));
        }
        if let Ok(addr) = endpoint.parse::<SocketAddrV4>() {
            return Ok(Self::Tcp(SocketAddr::V4(addr)));
        }
        Ok(Self::Serial {
            path: endpoint.to_string(),
            baud_rate,
        })
    }

    /// Whether this endpoint is a TCP socket.
    pub fn is_tcp(&self) -> bool {
        matches!(self, Self::Tcp(_))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serial { path, baud_rate } => write!(f, "{path}@{baud_rate}"),
            Self::Tcp(addr) => write!(f, "tcp://{addr}"),
        }
    }
}

/// Link configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// TTY path or IPv4 address.
    pub endpoint: String,
    /// Baud rate used for TTY endpoints.
    pub baud_rate: u32,
    /// Port used for bare IPv4 endpoints.
    pub tcp_port: u16,
    /// Read timeout; bounds how long one read may block.
    pub read_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            tcp_port: DEFAULT_TCP_PORT,
            read_timeout: Duration::from_millis(20),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    /// Config for an endpoint with default parameters.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Override the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Override the TCP port.
    pub fn with_tcp_port(mut self, tcp_port: u16) -> Self {
        self.tcp_port = tcp_port;
        self
    }

    /// Override the read timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Resolve the endpoint string.
    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.endpoint, self.baud_rate, self.tcp_port)
    }
}

/// Open the link described by `config`.
pub fn open(config: &TransportConfig) -> Result<UsiStream> {
    match config.endpoint()? {
        Endpoint::Serial { path, baud_rate } => {
            SerialLink::open(&path, baud_rate, config.read_timeout)
        }
        Endpoint::Tcp(addr) => TcpLink::connect(addr, config.connect_timeout, config.read_timeout),
    }
}
