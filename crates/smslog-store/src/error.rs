//! Store error types.

use smslog_core::CodecError;

use crate::blob::BlobPath;

/// Failure talking to the remote blob store.
///
/// "Not found" and "version conflict" are not errors at this level; they
/// are reported through [`FetchOutcome`](crate::FetchOutcome) and
/// [`CommitOutcome`](crate::CommitOutcome).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP transport error (connect, timeout, TLS).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The store answered with an unexpected status (auth, rate limit, 5xx, ...).
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body could not be deserialized.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Response was well-formed JSON but its payload is unusable.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
    /// The store returned content in an encoding this client cannot read.
    #[error("{endpoint} returned content with unsupported encoding {encoding:?}")]
    UnsupportedEncoding { endpoint: String, encoding: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl StoreError {
    /// HTTP status, when the store answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http { source, .. } | Self::Deserialization { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }
}

/// Failure of a [`VersionedLogStore`](crate::VersionedLogStore) operation.
///
/// Any of these means the remote log was left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum LogStoreError {
    /// Another writer committed between our read and our write.
    #[error("commit to {path} rejected: log changed since it was read")]
    Conflict { path: BlobPath },
    /// Reading or writing the remote blob failed.
    #[error("store request for {path} failed: {source}")]
    Store {
        path: BlobPath,
        #[source]
        source: StoreError,
    },
    /// Existing content is present but is not a valid log.
    #[error("existing content at {path} is not a valid log: {source}")]
    MalformedContent {
        path: BlobPath,
        #[source]
        source: CodecError,
    },
    /// Updated content could not be encoded.
    #[error("failed to encode log content: {0}")]
    Encode(#[source] CodecError),
}

impl LogStoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Short machine-readable category, used for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => "conflict",
            Self::Store { .. } => "transport",
            Self::MalformedContent { .. } => "malformed",
            Self::Encode(_) => "encode",
        }
    }
}
