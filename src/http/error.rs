//! Errors raised while parsing messages or completing responses.

use thiserror::Error;

/// Failure to turn bytes into a [`Request`](super::Request) or
/// [`Response`](super::Response).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Start line or header lines are not well formed.
    #[error("malformed message: {0}")]
    Malformed(&'static str),
    /// Protocol version token other than `HTTP/1.1`.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),
    /// Method token that is not served.
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    /// Text ends in the middle of a UTF-8 sequence; more bytes are needed.
    #[error("incomplete message")]
    Incomplete,
}

/// Misuse of the one-shot response completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("response was already completed")]
    AlreadyCompleted,
}
