//! # smslog-store: Versioned Log Storage
//!
//! Turns "append one record" into a safe update of a remotely hosted,
//! versioned JSON file:
//!
//! ```text
//! resolve period → fetch (or NotFound) → decode → append → encode → commit(precondition)
//! ```
//!
//! ## Architecture
//!
//! - [`BlobStore`] is the capability boundary: `fetch` and `commit` against
//!   a path, with an optional version precondition on commit.
//! - [`GitHubContentStore`] implements it over the GitHub Contents API.
//! - [`InMemoryBlobStore`] implements it in process, with fault injection,
//!   for tests.
//! - [`VersionedLogStore`] owns the read-modify-write protocol and is the
//!   only type callers need.
//!
//! ## Failure Policy
//!
//! Only a "does not exist" answer from the store starts a fresh log. Every
//! other read failure, malformed existing content, a stale version at commit
//! time, or a failed write aborts the append. Nothing is retried here; a
//! losing concurrent writer is retried, if at all, by the caller.

pub mod blob;
pub mod config;
pub mod error;
pub mod github;
pub mod log_store;
pub mod memory;

pub use blob::{BlobPath, BlobStore, CommitOutcome, CommitRequest, FetchOutcome, RemoteBlob};
pub use config::{ConfigError, GitHubConfig, RepoSlug};
pub use error::{LogStoreError, StoreError};
pub use github::GitHubContentStore;
pub use log_store::{AppendReceipt, LogLayout, VersionedLogStore};
pub use memory::{CommitAttempt, InMemoryBlobStore};

/// Build a [`VersionedLogStore`] backed by GitHub from configuration.
pub fn connect(config: &GitHubConfig) -> Result<VersionedLogStore<GitHubContentStore>, StoreError> {
    let backend = GitHubContentStore::new(config)?;
    Ok(VersionedLogStore::new(backend, config.resolver(), config.layout()))
}
