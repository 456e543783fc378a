//! Remote blob capability.
//!
//! The minimal interface [`VersionedLogStore`](crate::VersionedLogStore)
//! needs from a versioned file host. "Not found" is an outcome, not an
//! error, so that it can never be confused with a transport or auth failure.

use std::fmt;
use std::future::Future;

use smslog_core::{PeriodKey, VersionToken};

use crate::error::StoreError;

/// Location of one period's log inside the remote repository,
/// e.g. `data/2024-03.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath(String);

impl BlobPath {
    /// Path of the log for `key` under `log_dir`.
    ///
    /// Leading and trailing `/` are stripped from `log_dir`; an empty
    /// directory places the file at the repository root.
    pub fn for_period(log_dir: &str, key: &PeriodKey) -> Self {
        let dir = log_dir.trim_matches('/');
        if dir.is_empty() {
            Self(format!("{key}.json"))
        } else {
            Self(format!("{dir}/{key}.json"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty path segments, for URL construction.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content and revision of an existing blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBlob {
    pub content: Vec<u8>,
    pub version: VersionToken,
}

/// Result of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(RemoteBlob),
    /// The store positively reported that no blob exists at this path.
    NotFound,
}

/// A write of the full blob content.
#[derive(Debug, Clone, Copy)]
pub struct CommitRequest<'a> {
    pub content: &'a [u8],
    /// Human-readable change description.
    pub message: &'a str,
    /// Revision the content was derived from; `None` means create.
    pub precondition: Option<&'a VersionToken>,
}

/// Result of a write that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { version: VersionToken },
    /// The precondition no longer matches the blob's current revision.
    Conflict,
}

/// A remote store of versioned blobs.
///
/// Implementations must be `Send + Sync` and return `Send` futures so a
/// single instance can serve concurrent requests from an async runtime.
pub trait BlobStore: Send + Sync {
    fn fetch(
        &self,
        path: &BlobPath,
    ) -> impl Future<Output = Result<FetchOutcome, StoreError>> + Send;

    fn commit(
        &self,
        path: &BlobPath,
        request: CommitRequest<'_>,
    ) -> impl Future<Output = Result<CommitOutcome, StoreError>> + Send;
}
