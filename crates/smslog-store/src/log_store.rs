//! # Versioned Log Store
//!
//! The read-modify-write-commit protocol for appending one record to a
//! period's log:
//!
//! 1. Resolve the period key for `now` and derive the blob path.
//! 2. Fetch. `NotFound` starts an empty log with no version; any error
//!    aborts.
//! 3. Decode existing content. Malformed content aborts.
//! 4. Append the new record after all existing records.
//! 5. Encode the full log and commit it with the version read in step 2 as
//!    precondition (none for a create).
//!
//! A rejected precondition is reported as [`LogStoreError::Conflict`] and
//! is not retried. Either the whole updated log is committed or the remote
//! blob is left as it was.

use chrono::{DateTime, Utc};
use smslog_core::{
    decode_records, encode_records, LogBlob, LogKeyResolver, LogRecord, MonthlyKeyResolver,
    PeriodKey, VersionToken,
};

use crate::blob::{BlobPath, BlobStore, CommitOutcome, CommitRequest, FetchOutcome};
use crate::config::DEFAULT_COMMIT_MESSAGE;
use crate::error::LogStoreError;

/// Where logs live and how commits are described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLayout {
    /// Directory holding one file per period.
    pub log_dir: String,
    /// Commit description used for every append.
    pub commit_message: String,
}

impl Default for LogLayout {
    fn default() -> Self {
        Self {
            log_dir: "data".to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

impl LogLayout {
    pub fn blob_path(&self, key: &PeriodKey) -> BlobPath {
        BlobPath::for_period(&self.log_dir, key)
    }
}

/// Outcome of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReceipt {
    pub period: PeriodKey,
    pub path: BlobPath,
    /// The record that was appended.
    pub record: LogRecord,
    /// Revision created by the commit.
    pub version: VersionToken,
    /// Number of records in the log after the append.
    pub record_count: usize,
    /// Whether this append created the period's log.
    pub created: bool,
}

/// Appends records to per-period logs held in a [`BlobStore`].
///
/// Holds no mutable state; a single instance can serve concurrent
/// requests. Concurrent appends to the same period are arbitrated by the
/// store's version check, and the losers receive
/// [`LogStoreError::Conflict`].
#[derive(Debug, Clone)]
pub struct VersionedLogStore<B, R = MonthlyKeyResolver> {
    backend: B,
    resolver: R,
    layout: LogLayout,
}

impl<B: BlobStore, R: LogKeyResolver> VersionedLogStore<B, R> {
    pub fn new(backend: B, resolver: R, layout: LogLayout) -> Self {
        Self {
            backend,
            resolver,
            layout,
        }
    }

    /// Period key an append at `now` targets.
    pub fn period_for(&self, now: &DateTime<Utc>) -> PeriodKey {
        self.resolver.resolve(now)
    }

    pub fn path_for(&self, period: &PeriodKey) -> BlobPath {
        self.layout.blob_path(period)
    }

    /// Read a period's log. A log that does not exist yet reads as empty.
    pub async fn read(&self, period: &PeriodKey) -> Result<LogBlob, LogStoreError> {
        self.load(&self.path_for(period)).await
    }

    /// Append `message`, stamped with `now`, to the log for `now`'s period.
    pub async fn append(
        &self,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<AppendReceipt, LogStoreError> {
        let period = self.resolver.resolve(&now);
        let path = self.layout.blob_path(&period);

        let mut blob = self.load(&path).await?;
        let created = !blob.exists_remotely();

        let record = LogRecord::new(message, &now);
        blob.push(record.clone());
        let content = encode_records(&blob.records).map_err(LogStoreError::Encode)?;

        let request = CommitRequest {
            content: &content,
            message: &self.layout.commit_message,
            precondition: blob.version.as_ref(),
        };
        let outcome = self
            .backend
            .commit(&path, request)
            .await
            .map_err(|source| LogStoreError::Store {
                path: path.clone(),
                source,
            })?;

        match outcome {
            CommitOutcome::Committed { version } => {
                tracing::info!(
                    %period,
                    %path,
                    %version,
                    record_count = blob.len(),
                    created,
                    "appended record"
                );
                Ok(AppendReceipt {
                    period,
                    path,
                    record,
                    version,
                    record_count: blob.len(),
                    created,
                })
            }
            CommitOutcome::Conflict => {
                tracing::warn!(
                    %period,
                    %path,
                    precondition = blob.version.as_ref().map(VersionToken::as_str).unwrap_or("<create>"),
                    "append lost a concurrent update; not retrying"
                );
                Err(LogStoreError::Conflict { path })
            }
        }
    }

    async fn load(&self, path: &BlobPath) -> Result<LogBlob, LogStoreError> {
        let fetched = self
            .backend
            .fetch(path)
            .await
            .map_err(|source| LogStoreError::Store {
                path: path.clone(),
                source,
            })?;

        match fetched {
            FetchOutcome::Found(remote) => {
                let records =
                    decode_records(&remote.content).map_err(|source| {
                        LogStoreError::MalformedContent {
                            path: path.clone(),
                            source,
                        }
                    })?;
                tracing::debug!(%path, version = %remote.version, records = records.len(), "loaded log");
                Ok(LogBlob::from_remote(records, remote.version))
            }
            FetchOutcome::NotFound => {
                tracing::debug!(%path, "log does not exist yet; starting empty");
                Ok(LogBlob::empty())
            }
        }
    }
}
