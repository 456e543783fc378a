//! # Prometheus Metrics
//!
//! Counters and latency for message appends, exported at `/metrics`.

use std::sync::Arc;

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome label for a message that was not stored because of its sender.
pub const OUTCOME_REJECTED: &str = "rejected";
/// Outcome label for a stored message.
pub const OUTCOME_STORED: &str = "stored";

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct SmsMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    messages_total: IntCounterVec,
    append_duration_seconds: Histogram,
}

impl std::fmt::Debug for SmsMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsMetrics")
            .field("stored", &self.messages(OUTCOME_STORED))
            .finish()
    }
}

impl SmsMetrics {
    /// Create a metrics instance with a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let messages_total = IntCounterVec::new(
            Opts::new(
                "smslog_messages_total",
                "Inbound messages by outcome (stored, rejected, or the append failure kind)",
            ),
            &["outcome"],
        )?;
        let append_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "smslog_append_duration_seconds",
                "Time spent appending one message to the log store",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(messages_total.clone()))?;
        registry.register(Box::new(append_duration_seconds.clone()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                messages_total,
                append_duration_seconds,
            }),
        })
    }

    /// Count one inbound message under `outcome`.
    pub fn record_message(&self, outcome: &str) {
        self.inner
            .messages_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn observe_append(&self, duration_secs: f64) {
        self.inner.append_duration_seconds.observe(duration_secs);
    }

    /// Current count for `outcome`.
    pub fn messages(&self, outcome: &str) -> u64 {
        self.inner
            .messages_total
            .with_label_values(&[outcome])
            .get()
    }

    /// Gather all metrics and encode them in Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.inner.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
