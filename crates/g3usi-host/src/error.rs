use std::time::Duration;

use g3usi_proto::Status;

use crate::correlation::SyncChannel;

/// Errors that can occur in host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] g3usi_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] g3usi_frame::FrameError),

    /// A message could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] g3usi_proto::CodecError),

    /// A set request was refused before transmission.
    #[error("invalid attribute value: {0}")]
    Validation(#[from] g3usi_proto::ValidationError),

    /// A synchronous call is already in flight on this channel.
    #[error("synchronous call already pending on {0}")]
    Busy(SyncChannel),

    /// No confirm arrived before the deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The link was closed or reached EOF.
    #[error("modem disconnected: {0}")]
    Disconnected(String),

    /// The device answered with a failure status.
    #[error("device rejected request: {0}")]
    Rejected(Status),

    /// A callback was registered twice for the same message kind.
    #[error("callback already registered for {protocol} kind {kind}")]
    DuplicateCallback { protocol: &'static str, kind: u8 },

    /// The confirm stored for a call did not have the expected shape.
    #[error("unexpected confirm: {0}")]
    UnexpectedConfirm(&'static str),

    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HostError>;
