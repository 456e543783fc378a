//! # Log Records and Blobs
//!
//! A [`LogRecord`] is one appended message. A [`LogBlob`] is the in-memory,
//! request-scoped copy of one period's log together with the
//! [`VersionToken`] of the remote revision it was read from.
//!
//! ## Timestamps
//!
//! New records are stamped `YYYY-MM-DDTHH:MM:SS` in UTC, truncated to
//! seconds. The format has no offset suffix and sorts lexicographically in
//! chronological order. Records read back from storage keep whatever text
//! they were written with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Render a moment in the record timestamp format.
pub fn format_timestamp(now: &DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// One entry in a period's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogRecord {
    /// Message text as received. May be empty.
    pub message: String,
    /// Time of append.
    pub timestamp: String,
}

impl LogRecord {
    /// Create a record stamped with `now`.
    pub fn new(message: impl Into<String>, now: &DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            timestamp: format_timestamp(now),
        }
    }
}

/// Opaque identifier of one revision of a remote blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Result<Self, CoreError> {
        let token = token.into();
        if token.is_empty() {
            return Err(CoreError::InvalidVersionToken);
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VersionToken {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VersionToken> for String {
    fn from(token: VersionToken) -> Self {
        token.0
    }
}

/// The full content of one period's log.
///
/// `version` is `None` when the remote blob did not exist at read time; the
/// next write must then be a create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBlob {
    pub records: Vec<LogRecord>,
    pub version: Option<VersionToken>,
}

impl LogBlob {
    /// A log that does not exist remotely yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A log read from an existing remote revision.
    pub fn from_remote(records: Vec<LogRecord>, version: VersionToken) -> Self {
        Self {
            records,
            version: Some(version),
        }
    }

    /// Append a record after all existing ones.
    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether this blob was read from an existing remote revision.
    pub fn exists_remotely(&self) -> bool {
        self.version.is_some()
    }
}
