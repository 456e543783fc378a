//! # Period Keys
//!
//! A [`PeriodKey`] names the log segment a message is appended to. Every
//! moment within the same calendar period resolves to the same key, and
//! therefore to the same remote blob.
//!
//! The granularity is a policy held by a [`LogKeyResolver`]. The default
//! policy, [`MonthlyKeyResolver`], groups by calendar month in UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const MAX_KEY_LEN: usize = 64;

/// Identity of one log segment, e.g. `2024-03` or `March-2024`.
///
/// Restricted to ASCII alphanumerics, `-` and `_` so it is always safe to
/// use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Validate and wrap a period key.
    pub fn new(key: impl Into<String>) -> Result<Self, CoreError> {
        let key = key.into();
        if key.is_empty() {
            return Err(CoreError::InvalidPeriodKey {
                key,
                reason: "must not be empty",
            });
        }
        if key.len() > MAX_KEY_LEN {
            return Err(CoreError::InvalidPeriodKey {
                key,
                reason: "longer than 64 characters",
            });
        }
        if !key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(CoreError::InvalidPeriodKey {
                key,
                reason: "only ASCII letters, digits, '-' and '_' are allowed",
            });
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PeriodKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.0
    }
}

/// Maps a moment in time to the period key it should be appended under.
///
/// Implementations must be pure and total: the same input always yields
/// the same key, and two moments in the same period yield equal keys.
pub trait LogKeyResolver: Send + Sync {
    fn resolve(&self, now: &DateTime<Utc>) -> PeriodKey;
}

/// Rendering of a monthly period key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// `2024-03`. Sorts chronologically.
    #[default]
    Numeric,
    /// `March-2024`, the file naming used by earlier deployments.
    Named,
}

impl KeyStyle {
    fn pattern(self) -> &'static str {
        match self {
            Self::Numeric => "%Y-%m",
            Self::Named => "%B-%Y",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Named => "named",
        }
    }
}

impl fmt::Display for KeyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" => Ok(Self::Numeric),
            "named" => Ok(Self::Named),
            _ => Err(CoreError::InvalidKeyStyle(s.to_string())),
        }
    }
}

/// Groups appends by UTC calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyKeyResolver {
    style: KeyStyle,
}

impl MonthlyKeyResolver {
    pub fn new(style: KeyStyle) -> Self {
        Self { style }
    }
}

impl LogKeyResolver for MonthlyKeyResolver {
    fn resolve(&self, now: &DateTime<Utc>) -> PeriodKey {
        // `%Y` prefixes a '+' past year 9999; drop anything a key cannot hold.
        let raw = now.format(self.style.pattern()).to_string();
        PeriodKey::new(raw.as_str()).unwrap_or_else(|_| {
            PeriodKey(
                raw.chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                    .collect(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn numeric_style_is_year_dash_month() {
        let resolver = MonthlyKeyResolver::default();
        assert_eq!(resolver.resolve(&at(2024, 3, 2, 0, 0, 0)).as_str(), "2024-03");
        assert_eq!(resolver.resolve(&at(1999, 12, 31, 23, 59, 59)).as_str(), "1999-12");
    }

    #[test]
    fn named_style_matches_legacy_file_names() {
        let resolver = MonthlyKeyResolver::new(KeyStyle::Named);
        assert_eq!(resolver.resolve(&at(2024, 3, 2, 0, 0, 0)).as_str(), "March-2024");
        assert_eq!(resolver.resolve(&at(2023, 9, 1, 8, 0, 0)).as_str(), "September-2023");
    }

    #[test]
    fn five_digit_years_still_yield_valid_keys() {
        let key = MonthlyKeyResolver::default().resolve(&at(10000, 3, 1, 0, 0, 0));
        assert_eq!(key.as_str(), "10000-03");
        assert_eq!(PeriodKey::new(key.as_str()).unwrap(), key);

        let named = MonthlyKeyResolver::new(KeyStyle::Named).resolve(&at(10000, 3, 1, 0, 0, 0));
        assert_eq!(named.as_str(), "March-10000");
    }

    #[test]
    fn month_boundaries_split_keys() {
        let resolver = MonthlyKeyResolver::default();
        let last_second = resolver.resolve(&at(2024, 1, 31, 23, 59, 59));
        let first_second = resolver.resolve(&at(2024, 2, 1, 0, 0, 0));
        assert_ne!(last_second, first_second);
    }

    #[test]
    fn resolved_keys_pass_validation() {
        for style in [KeyStyle::Numeric, KeyStyle::Named] {
            let key = MonthlyKeyResolver::new(style).resolve(&at(2025, 7, 4, 12, 0, 0));
            assert_eq!(PeriodKey::new(key.as_str()).unwrap(), key);
        }
    }

    #[test]
    fn period_key_rejects_path_characters() {
        assert!(PeriodKey::new("").is_err());
        assert!(PeriodKey::new("../secrets").is_err());
        assert!(PeriodKey::new("2024/03").is_err());
        assert!(PeriodKey::new("2024 03").is_err());
        assert!(PeriodKey::new("x".repeat(65)).is_err());
        assert!(PeriodKey::new("2024-03").is_ok());
        assert!(PeriodKey::new("March_2024").is_ok());
    }

    #[test]
    fn period_key_serde_validates() {
        let key: PeriodKey = serde_json::from_str("\"2024-03\"").unwrap();
        assert_eq!(key.as_str(), "2024-03");
        assert!(serde_json::from_str::<PeriodKey>("\"a/b\"").is_err());
    }

    #[test]
    fn key_style_parses_case_insensitively() {
        assert_eq!("Numeric".parse::<KeyStyle>().unwrap(), KeyStyle::Numeric);
        assert_eq!(" NAMED ".parse::<KeyStyle>().unwrap(), KeyStyle::Named);
        assert!(matches!(
            "weekly".parse::<KeyStyle>(),
            Err(CoreError::InvalidKeyStyle(_))
        ));
    }

    fn moment() -> impl Strategy<Value = DateTime<Utc>> {
        (1970i32..2200, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60)
            .prop_map(|(y, m, d, h, mi, s)| at(y, m, d, h, mi, s))
    }

    proptest! {
        #[test]
        fn same_month_same_key(a in moment(), day in 1u32..=28, hour in 0u32..24) {
            let b = at(a.year(), a.month(), day, hour, 0, 0);
            for style in [KeyStyle::Numeric, KeyStyle::Named] {
                let resolver = MonthlyKeyResolver::new(style);
                prop_assert_eq!(resolver.resolve(&a), resolver.resolve(&b));
            }
        }

        #[test]
        fn different_months_different_keys(a in moment(), b in moment()) {
            prop_assume!((a.year(), a.month()) != (b.year(), b.month()));
            for style in [KeyStyle::Numeric, KeyStyle::Named] {
                let resolver = MonthlyKeyResolver::new(style);
                prop_assert_ne!(resolver.resolve(&a), resolver.resolve(&b));
            }
        }
    }
}
