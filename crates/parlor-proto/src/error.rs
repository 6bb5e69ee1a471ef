//! Error types for the chat protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Protocol-level errors raised while framing or decoding client input.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying socket failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line (or an unterminated partial line) exceeded the configured limit.
    #[error("line too long: {actual} bytes (limit {limit})")]
    MessageTooLong { actual: usize, limit: usize },

    /// The line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}: {details}")]
    InvalidUtf8 { byte_pos: usize, details: String },

    /// The line was valid text but not a well-formed request object.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
}
