//! GitHub store configuration.
//!
//! Loaded from environment variables. Defaults point at the public GitHub
//! API; override `GITHUB_API_URL` for GitHub Enterprise or tests.

use std::fmt;
use std::str::FromStr;

use smslog_core::{KeyStyle, MonthlyKeyResolver};
use url::Url;
use zeroize::Zeroizing;

use crate::log_store::LogLayout;

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_LOG_DIR: &str = "data";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default commit description for appends.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Append SMS message";

/// A repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSlug {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRepository(s.to_string());
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        };
        if !valid(owner) || !valid(name) {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Configuration for the GitHub-backed log store.
///
/// Custom `Debug` implementation redacts the `token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct GitHubConfig {
    /// API base URL. Default: <https://api.github.com>
    pub api_url: Url,
    /// Repository holding the logs.
    pub repository: RepoSlug,
    /// Branch the logs are committed to.
    pub branch: String,
    /// Directory inside the repository holding one file per period.
    pub log_dir: String,
    /// Period key rendering.
    pub key_style: KeyStyle,
    /// Commit description used for every append.
    pub commit_message: String,
    /// Bearer token for API authentication.
    pub token: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("log_dir", &self.log_dir)
            .field("key_style", &self.key_style)
            .field("commit_message", &self.commit_message)
            .field("token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GitHubConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `GITHUB_TOKEN` (required)
    /// - `GITHUB_REPO` (required, `owner/name`)
    /// - `GITHUB_BRANCH` (default: `main`)
    /// - `GITHUB_API_URL` (default: `https://api.github.com`)
    /// - `GITHUB_TIMEOUT_SECS` (default: 30)
    /// - `SMSLOG_DIR` (default: `data`)
    /// - `SMSLOG_KEY_STYLE` (default: `numeric`; or `named`)
    /// - `SMSLOG_COMMIT_MESSAGE` (default: `Append SMS message`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("GITHUB_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;
        let repository = lookup("GITHUB_REPO")
            .ok_or(ConfigError::MissingRepository)?
            .parse()?;
        let api_url = lookup_url(&lookup, "GITHUB_API_URL", DEFAULT_API_URL)?;
        let key_style = match lookup("SMSLOG_KEY_STYLE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidKeyStyle(raw))?,
            None => KeyStyle::default(),
        };

        Ok(Self {
            api_url,
            repository,
            branch: lookup("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            log_dir: lookup("SMSLOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            key_style,
            commit_message: lookup("SMSLOG_COMMIT_MESSAGE")
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
            token: Zeroizing::new(token),
            timeout_secs: lookup("GITHUB_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    pub fn for_base_url(base_url: &str, repository: &str, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: Url::parse(base_url)
                .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?,
            repository: repository.parse()?,
            branch: DEFAULT_BRANCH.to_string(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            key_style: KeyStyle::default(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
        })
    }

    pub fn resolver(&self) -> MonthlyKeyResolver {
        MonthlyKeyResolver::new(self.key_style)
    }

    pub fn layout(&self) -> LogLayout {
        LogLayout {
            log_dir: self.log_dir.clone(),
            commit_message: self.commit_message.clone(),
        }
    }
}

fn lookup_url(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: &str,
) -> Result<Url, ConfigError> {
    let raw = lookup(var).unwrap_or_else(|| default.to_string());
    let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            "expected an http(s) base URL".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN environment variable is required")]
    MissingToken,
    #[error("GITHUB_REPO environment variable is required")]
    MissingRepository,
    #[error("invalid repository {0:?}; expected owner/name")]
    InvalidRepository(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid SMSLOG_KEY_STYLE {0:?}; expected numeric or named")]
    InvalidKeyStyle(String),
    #[error("invalid API token: {0}")]
    InvalidToken(String),
}
