//! Client-facing error types.

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors surfaced by the client API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// An operation that needs an established connection ran while the
    /// client was not connected. Nothing is queued for retry.
    #[error("not connected")]
    NotConnected,

    /// I/O failure while opening or using the transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire protocol failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] bedrock_proto::ProtocolError),
}
