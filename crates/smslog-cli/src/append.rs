//! # Append CLI: add one message to the current period's log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use smslog_store::{AppendReceipt, BlobStore, GitHubConfig, VersionedLogStore};

use crate::parse_moment;

/// Append subcommand arguments.
#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Message text. Leading and trailing whitespace is removed.
    pub message: String,

    /// Timestamp to record instead of the current time (RFC 3339).
    #[arg(long, value_parser = parse_moment)]
    pub at: Option<DateTime<Utc>>,
}

/// Execute the append subcommand against the GitHub store.
pub async fn run_append(args: &AppendArgs) -> Result<u8> {
    let config = GitHubConfig::from_env().context("loading store configuration")?;
    let log = smslog_store::connect(&config).context("building GitHub client")?;
    let receipt = append(&log, args).await?;
    println!("{}", describe(&receipt));
    Ok(0)
}

/// Append `args.message` through `log`.
pub async fn append<B: BlobStore>(
    log: &VersionedLogStore<B>,
    args: &AppendArgs,
) -> Result<AppendReceipt> {
    let now = args.at.unwrap_or_else(Utc::now);
    let receipt = log
        .append(args.message.trim(), now)
        .await
        .with_context(|| format!("appending to {}", log.path_for(&log.period_for(&now))))?;
    tracing::debug!(version = %receipt.version, "append committed");
    Ok(receipt)
}

/// Human-readable summary of a successful append.
pub fn describe(receipt: &AppendReceipt) -> String {
    format!(
        "{verb} {path} (period {period}): {count} record{s}, version {version}",
        verb = if receipt.created { "Created" } else { "Updated" },
        path = receipt.path,
        period = receipt.period,
        count = receipt.record_count,
        s = if receipt.record_count == 1 { "" } else { "s" },
        version = receipt.version,
    )
}
