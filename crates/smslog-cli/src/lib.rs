//! # smslog-cli: CLI Tool for smslog
//!
//! Provides the `smslog` command-line interface for working with the
//! monthly message logs outside the webhook.
//!
//! ## Subcommands
//!
//! - `smslog append`: Append one message through the configured store.
//! - `smslog show`: Print one period's log.
//! - `smslog key`: Resolve the period key and file path for a moment.
//!
//! `append` and `show` read the store configuration from the environment
//! (`GITHUB_TOKEN`, `GITHUB_REPO`, ...). `key` works offline.
//!
//! ```bash
//! smslog append "picked up the parcel"
//! smslog show --period 2024-03 --json
//! smslog key --at 2024-03-31T23:59:59Z --style named
//! ```

pub mod append;
pub mod key;
pub mod show;

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp argument into UTC.
pub fn parse_moment(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp like 2024-03-01T12:00:00Z: {e}"))
}
