//! # Application State
//!
//! Shared state for the Axum application: the log store, service
//! configuration, and metrics.

use std::sync::Arc;

use smslog_store::{BlobStore, VersionedLogStore};

use crate::metrics::SmsMetrics;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REPLY_OK: &str = "Message received :^)";
const DEFAULT_REPLY_FAILED: &str = "Failed to save the message :^(";

/// Text sent back to the SMS sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyText {
    pub ok: String,
    pub failed: String,
}

impl Default for ReplyText {
    fn default() -> Self {
        Self {
            ok: DEFAULT_REPLY_OK.to_string(),
            failed: DEFAULT_REPLY_FAILED.to_string(),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// When set, only messages from this sender are stored.
    pub allowed_sender: Option<String>,
    pub replies: ReplyText,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_sender: None,
            replies: ReplyText::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// - `PORT` (default: 8080)
    /// - `SMSLOG_ALLOWED_SENDER`, falling back to `MY_NUMBER`
    /// - `SMSLOG_REPLY_OK`, `SMSLOG_REPLY_FAILED`
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = ReplyText::default();
        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            allowed_sender: non_empty("SMSLOG_ALLOWED_SENDER").or_else(|| non_empty("MY_NUMBER")),
            replies: ReplyText {
                ok: lookup("SMSLOG_REPLY_OK").unwrap_or(defaults.ok),
                failed: lookup("SMSLOG_REPLY_FAILED").unwrap_or(defaults.failed),
            },
        }
    }

    /// Whether a message from `from` should be stored.
    pub fn accepts(&self, from: Option<&str>) -> bool {
        match &self.allowed_sender {
            None => true,
            Some(allowed) => from.map(str::trim) == Some(allowed.as_str()),
        }
    }
}

/// Shared application state passed to all route handlers.
///
/// Generic over the blob store so the same router serves GitHub in
/// production and an in-memory store in tests.
pub struct AppState<B> {
    pub log: Arc<VersionedLogStore<B>>,
    pub config: Arc<AppConfig>,
    pub metrics: SmsMetrics,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            config: Arc::clone(&self.config),
            metrics: self.metrics.clone(),
        }
    }
}

impl<B: BlobStore> AppState<B> {
    pub fn new(log: VersionedLogStore<B>, config: AppConfig) -> Result<Self, prometheus::Error> {
        Ok(Self {
            log: Arc::new(log),
            config: Arc::new(config),
            metrics: SmsMetrics::new()?,
        })
    }
}
