/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The trailing CRC does not match header + payload.
    #[error("CRC mismatch (computed {computed:#06x}, received {received:#06x})")]
    InvalidCrc { computed: u16, received: u16 },

    /// An escape byte was followed by a frame marker or by nothing.
    #[error("invalid escape sequence")]
    InvalidEscape,

    /// The frame is not delimited by start/end markers.
    #[error("missing frame marker")]
    MissingMarker,

    /// The frame is too short to hold a header and CRC.
    #[error("frame too short ({0} bytes)")]
    TooShort(usize),

    /// The header length does not match the bytes received.
    #[error("malformed header (declared length {declared}, received {actual})")]
    MalformedHeader { declared: usize, actual: usize },

    /// The discriminator does not fit in 6 bits.
    #[error("invalid protocol id {0:#04x}")]
    InvalidProtocol(u8),

    /// The payload exceeds what the header or the MTU can carry.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link was closed.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
