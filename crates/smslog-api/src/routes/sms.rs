//! # SMS Webhook
//!
//! `POST /sms` (form-encoded) and `GET /sms` (query string) accept the
//! provider's inbound-message callback, append the message body to the
//! current period's log, and reply with TwiML.
//!
//! The reply is always HTTP 200. Whether the message was stored is told to
//! the sender through the reply text; the failure itself is logged and
//! counted here.

use std::time::Instant;

use axum::extract::{Form, Query, State};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use smslog_store::BlobStore;

use crate::metrics::{OUTCOME_REJECTED, OUTCOME_STORED};
use crate::state::AppState;
use crate::twiml::Twiml;

/// Fields of the inbound-message callback this service uses. Everything
/// else the provider sends is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct InboundSms {
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
}

pub fn router<B: BlobStore + 'static>() -> Router<AppState<B>> {
    Router::new().route("/sms", get(receive_query::<B>).post(receive_form::<B>))
}

async fn receive_form<B: BlobStore + 'static>(
    State(state): State<AppState<B>>,
    Form(sms): Form<InboundSms>,
) -> Twiml {
    receive(&state, sms).await
}

async fn receive_query<B: BlobStore + 'static>(
    State(state): State<AppState<B>>,
    Query(sms): Query<InboundSms>,
) -> Twiml {
    receive(&state, sms).await
}

async fn receive<B: BlobStore>(state: &AppState<B>, sms: InboundSms) -> Twiml {
    if !state.config.accepts(sms.from.as_deref()) {
        tracing::warn!(from = ?sms.from, "ignoring message from unexpected sender");
        state.metrics.record_message(OUTCOME_REJECTED);
        return Twiml::empty();
    }

    let body = sms.body.trim();
    let started = Instant::now();
    let result = state.log.append(body, Utc::now()).await;
    state.metrics.observe_append(started.elapsed().as_secs_f64());

    match result {
        Ok(receipt) => {
            state.metrics.record_message(OUTCOME_STORED);
            tracing::info!(
                period = %receipt.period,
                version = %receipt.version,
                record_count = receipt.record_count,
                "message stored"
            );
            Twiml::message(state.config.replies.ok.as_str())
        }
        Err(err) => {
            state.metrics.record_message(err.kind());
            tracing::error!(error = %err, kind = err.kind(), "failed to store message");
            Twiml::message(state.config.replies.failed.as_str())
        }
    }
}
