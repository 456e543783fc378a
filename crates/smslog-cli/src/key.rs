//! # Key CLI: resolve a period key without touching the store.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use smslog_core::{KeyStyle, LogKeyResolver, MonthlyKeyResolver};
use smslog_store::LogLayout;

use crate::parse_moment;

/// Key subcommand arguments.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Moment to resolve (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_moment)]
    pub at: Option<DateTime<Utc>>,

    /// Key rendering: `numeric` (2024-03) or `named` (March-2024).
    #[arg(long, default_value = "numeric")]
    pub style: KeyStyle,

    /// Log directory inside the repository.
    #[arg(long, default_value = "data")]
    pub dir: String,
}

pub fn run_key(args: &KeyArgs) -> Result<u8> {
    println!("{}", resolve(args));
    Ok(0)
}

/// `<key>\t<path>` for the requested moment.
pub fn resolve(args: &KeyArgs) -> String {
    let now = args.at.unwrap_or_else(Utc::now);
    let key = MonthlyKeyResolver::new(args.style).resolve(&now);
    let layout = LogLayout {
        log_dir: args.dir.clone(),
        ..LogLayout::default()
    };
    format!("{key}\t{}", layout.blob_path(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn resolves_both_styles() {
        let at = Some(Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap());
        let numeric = KeyArgs {
            at,
            style: KeyStyle::Numeric,
            dir: "data".into(),
        };
        assert_eq!(resolve(&numeric), "2024-03\tdata/2024-03.json");

        let named = KeyArgs {
            at,
            style: KeyStyle::Named,
            dir: "/texts/".into(),
        };
        assert_eq!(resolve(&named), "March-2024\ttexts/March-2024.json");
    }
}
