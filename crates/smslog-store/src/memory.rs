//! In-memory [`BlobStore`] for tests and local development.
//!
//! Enforces the same optimistic-concurrency rules as the remote store:
//! a create only succeeds when no blob exists, and an update only succeeds
//! when the precondition equals the current version.
//!
//! Cheaply cloneable via `Arc`; all clones share the same data, so a test
//! can hand one clone to the code under test and inspect another.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use smslog_core::VersionToken;

use crate::blob::{BlobPath, BlobStore, CommitOutcome, CommitRequest, FetchOutcome, RemoteBlob};
use crate::error::StoreError;

/// A commit request as it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAttempt {
    pub path: BlobPath,
    pub content: Vec<u8>,
    pub message: String,
    pub precondition: Option<VersionToken>,
}

/// A foreign write applied just before the next commit to `path`.
struct Race {
    path: BlobPath,
    content: Vec<u8>,
    version: VersionToken,
}

#[derive(Default)]
struct Inner {
    blobs: Mutex<HashMap<BlobPath, RemoteBlob>>,
    attempts: Mutex<Vec<CommitAttempt>>,
    fetch_faults: Mutex<VecDeque<StoreError>>,
    commit_faults: Mutex<VecDeque<StoreError>>,
    races: Mutex<Vec<Race>>,
    fetches: AtomicUsize,
    next_version: AtomicU64,
}

/// Shared in-memory blob store.
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blobs", &self.inner.blobs.lock().len())
            .field("fetches", &self.fetch_count())
            .field("commits", &self.inner.attempts.lock().len())
            .finish()
    }
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a blob with an explicit version.
    pub fn insert(&self, path: BlobPath, content: impl Into<Vec<u8>>, version: VersionToken) {
        self.inner.blobs.lock().insert(
            path,
            RemoteBlob {
                content: content.into(),
                version,
            },
        );
    }

    /// Current blob at `path`, if any.
    pub fn get(&self, path: &BlobPath) -> Option<RemoteBlob> {
        self.inner.blobs.lock().get(path).cloned()
    }

    /// Number of `fetch` calls served, including injected failures.
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    /// Every `commit` call received, in order, including failed ones.
    pub fn commit_attempts(&self) -> Vec<CommitAttempt> {
        self.inner.attempts.lock().clone()
    }

    /// Make the next `fetch` fail with `error`.
    pub fn fail_next_fetch(&self, error: StoreError) {
        self.inner.fetch_faults.lock().push_back(error);
    }

    /// Make the next `commit` fail with `error` without touching any blob.
    pub fn fail_next_commit(&self, error: StoreError) {
        self.inner.commit_faults.lock().push_back(error);
    }

    /// Simulate a concurrent writer: immediately before the next commit to
    /// `path`, the blob is replaced with `content` at `version`.
    pub fn race_next_commit(&self, path: BlobPath, content: impl Into<Vec<u8>>, version: VersionToken) {
        self.inner.races.lock().push(Race {
            path,
            content: content.into(),
            version,
        });
    }

    fn mint_version(&self) -> Result<VersionToken, StoreError> {
        let n = self.inner.next_version.fetch_add(1, Ordering::SeqCst) + 1;
        VersionToken::new(format!("mem-{n:08x}")).map_err(|e| StoreError::InvalidResponse {
            endpoint: "memory".into(),
            reason: e.to_string(),
        })
    }
}

impl BlobStore for InMemoryBlobStore {
    async fn fetch(&self, path: &BlobPath) -> Result<FetchOutcome, StoreError> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.inner.fetch_faults.lock().pop_front() {
            return Err(error);
        }
        Ok(match self.get(path) {
            Some(blob) => FetchOutcome::Found(blob),
            None => FetchOutcome::NotFound,
        })
    }

    async fn commit(
        &self,
        path: &BlobPath,
        request: CommitRequest<'_>,
    ) -> Result<CommitOutcome, StoreError> {
        self.inner.attempts.lock().push(CommitAttempt {
            path: path.clone(),
            content: request.content.to_vec(),
            message: request.message.to_string(),
            precondition: request.precondition.cloned(),
        });
        if let Some(error) = self.inner.commit_faults.lock().pop_front() {
            return Err(error);
        }

        let race = {
            let mut races = self.inner.races.lock();
            races
                .iter()
                .position(|r| &r.path == path)
                .map(|i| races.remove(i))
        };
        if let Some(race) = race {
            self.insert(race.path, race.content, race.version);
        }

        let mut blobs = self.inner.blobs.lock();
        let current = blobs.get(path).map(|b| &b.version);
        if current != request.precondition {
            return Ok(CommitOutcome::Conflict);
        }
        let version = self.mint_version()?;
        blobs.insert(
            path.clone(),
            RemoteBlob {
                content: request.content.to_vec(),
                version: version.clone(),
            },
        );
        Ok(CommitOutcome::Committed { version })
    }
}
