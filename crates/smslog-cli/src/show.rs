//! # Show CLI: print one period's log.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use smslog_core::{LogBlob, PeriodKey};
use smslog_store::{BlobStore, GitHubConfig, VersionedLogStore};

/// Show subcommand arguments.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Period key to print (e.g. 2024-03). Defaults to the current period.
    #[arg(long)]
    pub period: Option<PeriodKey>,

    /// Print the log as JSON instead of one line per record.
    #[arg(long)]
    pub json: bool,
}

/// Execute the show subcommand against the GitHub store.
pub async fn run_show(args: &ShowArgs) -> Result<u8> {
    let config = GitHubConfig::from_env().context("loading store configuration")?;
    let log = smslog_store::connect(&config).context("building GitHub client")?;
    println!("{}", show(&log, args).await?);
    Ok(0)
}

/// Read the requested period and render it.
pub async fn show<B: BlobStore>(log: &VersionedLogStore<B>, args: &ShowArgs) -> Result<String> {
    let period = match &args.period {
        Some(period) => period.clone(),
        None => log.period_for(&Utc::now()),
    };
    let blob = log
        .read(&period)
        .await
        .with_context(|| format!("reading {}", log.path_for(&period)))?;
    if args.json {
        render_json(&period, &blob)
    } else {
        Ok(render_text(&period, &blob))
    }
}

fn render_json(period: &PeriodKey, blob: &LogBlob) -> Result<String> {
    let value = serde_json::json!({
        "period": period,
        "version": blob.version,
        "records": blob.records,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn render_text(period: &PeriodKey, blob: &LogBlob) -> String {
    if !blob.exists_remotely() {
        return format!("No log for {period}.");
    }
    let mut out = format!("{period}: {} record(s)", blob.len());
    for record in &blob.records {
        out.push_str(&format!("\n  {}  {}", record.timestamp, record.message));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smslog_core::{MonthlyKeyResolver, VersionToken};
    use smslog_store::{BlobPath, InMemoryBlobStore, LogLayout};

    fn seeded() -> VersionedLogStore<InMemoryBlobStore> {
        let backend = InMemoryBlobStore::new();
        backend.insert(
            BlobPath::for_period("data", &PeriodKey::new("2024-03").unwrap()),
            r#"[{"message":"hi","timestamp":"2024-03-01T00:00:00"},{"message":"bye","timestamp":"2024-03-02T00:00:00"}]"#,
            VersionToken::new("abc123").unwrap(),
        );
        VersionedLogStore::new(backend, MonthlyKeyResolver::default(), LogLayout::default())
    }

    #[tokio::test]
    async fn text_lists_records_in_order() {
        let args = ShowArgs {
            period: Some(PeriodKey::new("2024-03").unwrap()),
            json: false,
        };
        let out = show(&seeded(), &args).await.unwrap();
        assert_eq!(
            out,
            "2024-03: 2 record(s)\n  2024-03-01T00:00:00  hi\n  2024-03-02T00:00:00  bye"
        );
    }

    #[tokio::test]
    async fn json_includes_version() {
        let args = ShowArgs {
            period: Some(PeriodKey::new("2024-03").unwrap()),
            json: true,
        };
        let out = show(&seeded(), &args).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["version"], "abc123");
        assert_eq!(value["records"][1]["message"], "bye");
    }

    #[tokio::test]
    async fn missing_period_says_so() {
        let args = ShowArgs {
            period: Some(PeriodKey::new("1999-01").unwrap()),
            json: false,
        };
        assert_eq!(show(&seeded(), &args).await.unwrap(), "No log for 1999-01.");
    }
}
