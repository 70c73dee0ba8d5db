//! Error types for the ServerQuery protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in a line.
    #[error("invalid UTF-8 in line at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// The raw line as bytes (before UTF-8 validation failed).
        raw_line: Vec<u8>,
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// Line exceeded maximum allowed length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// A line could not be parsed as a reply.
    #[error("invalid reply {string:?}: {cause}")]
    InvalidReply {
        /// The offending line.
        string: String,
        /// Why it was rejected.
        cause: String,
    },

    /// The peer did not open with the ServerQuery greeting.
    #[error("unexpected greeting: {0:?}")]
    UnexpectedGreeting(String),
}

impl ProtocolError {
    pub(crate) fn invalid_reply(string: &str, cause: impl Into<String>) -> Self {
        Self::InvalidReply {
            string: string.to_string(),
            cause: cause.into(),
        }
    }
}
