//! # Error Types
//!
//! Errors raised while constructing core values or converting log content
//! to and from its stored representation. All errors use `thiserror`.

use thiserror::Error;

/// Error constructing a core value from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The period key is empty or contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid period key {key:?}: {reason}")]
    InvalidPeriodKey {
        /// The rejected input.
        key: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A version token must be a non-empty string.
    #[error("version token must not be empty")]
    InvalidVersionToken,

    /// Unknown period key style name.
    #[error("unknown key style {0:?}; expected \"numeric\" or \"named\"")]
    InvalidKeyStyle(String),
}

/// Error decoding or encoding log content.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Stored content is not valid UTF-8.
    #[error("log content is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Stored content is not a JSON array of `{message, timestamp}` objects.
    #[error("log content is not a JSON array of records: {0}")]
    Json(#[from] serde_json::Error),
}
