//! Error types for the IRC protocol layer.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
///
/// [`ProtocolError::Io`] and [`ProtocolError::MessageTooLong`] are fatal to
/// the connection. [`ProtocolError::InvalidMessage`] is produced by
/// `Message::from_str`; the message codec drops such lines itself and never
/// surfaces this variant through a framed stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A single line exceeded the maximum allowed length without a delimiter.
    #[error("message too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Observed buffered length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Failed to parse a framed line as an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The line that failed to parse.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// No command token after the optional tags and prefix segments.
    #[error("missing command")]
    MissingCommand,
}
