/// Errors raised while encoding or decoding sub-protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload ended before a field could be read.
    #[error("message truncated (needed {needed} more bytes, {remaining} left)")]
    Truncated { needed: usize, remaining: usize },

    /// The payload carried no command byte.
    #[error("empty payload")]
    Empty,

    /// The command byte is not part of this protocol's catalog.
    #[error("unknown message kind {kind} for {protocol}")]
    UnknownKind { protocol: &'static str, kind: u8 },

    /// A field held a value outside its defined range.
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: u32 },

    /// Bytes remained after the last field.
    #[error("{0} trailing bytes")]
    TrailingBytes(usize),

    /// A variable-length field does not fit its length prefix.
    #[error("{field} too long ({len} bytes, max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A request was refused before transmission.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A request that must not be transmitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The encoded value length differs from the caller-declared length.
    #[error("attribute {id:#010x}: declared length {declared}, encoded {actual}")]
    LengthMismatch { id: u32, declared: u8, actual: usize },

    /// The value exceeds the table maximum.
    #[error("attribute {id:#010x}: value of {len} bytes exceeds max {max}")]
    ValueTooLong { id: u32, len: usize, max: usize },

    /// The value shape does not match the attribute's table row.
    #[error("attribute {id:#010x}: expected {expected}, got {actual}")]
    LayoutMismatch {
        id: u32,
        expected: &'static str,
        actual: &'static str,
    },

    /// The attribute is read-only.
    #[error("attribute {id:#010x} ({name}) is read-only")]
    ReadOnly { id: u32, name: &'static str },
}

impl CodecError {
    /// Whether this is a local refusal rather than a malformed message.
    pub fn is_validation(&self) -> bool {
        matches!(self, CodecError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
