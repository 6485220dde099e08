use std::net::SocketAddr;

/// Errors that can occur on the modem link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path} at {baud_rate} baud: {source}")]
    Open {
        path: String,
        baud_rate: u32,
        source: std::io::Error,
    },

    /// Failed to connect to the TCP endpoint.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The endpoint string is empty or otherwise unusable.
    #[error("invalid endpoint: {0:?}")]
    InvalidEndpoint(String),

    /// An I/O error occurred on the link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link has been shut down.
    #[error("transport shut down")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, TransportError>;
