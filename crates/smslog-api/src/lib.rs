//! # smslog-api: SMS Webhook Service
//!
//! Receives inbound SMS callbacks and appends each message to the current
//! month's log through [`smslog_store::VersionedLogStore`].
//!
//! ## API Surface
//!
//! | Route                 | Module             | Response |
//! |-----------------------|--------------------|----------|
//! | `POST /sms`, `GET /sms` | [`routes::sms`]  | TwiML reply |
//! | `GET /v1/logs/:period` | [`routes::logs`]  | JSON log |
//! | `GET /health/liveness`, `GET /health/readiness` | here | plain text |
//! | `GET /metrics`        | here               | Prometheus text |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → DefaultBodyLimit (64 KiB) → Handler
//! ```

pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod twiml;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use smslog_store::BlobStore;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Inbound message callbacks are a few hundred bytes; anything near this
/// limit is not a real callback.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Assemble the application router with all routes and middleware.
pub fn app<B: BlobStore + 'static>(state: AppState<B>) -> Router {
    let api = Router::new()
        .merge(routes::sms::router())
        .merge(routes::logs::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

    let probes = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(prometheus_metrics::<B>));

    Router::new()
        .merge(probes)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /metrics: Prometheus metrics scrape endpoint.
async fn prometheus_metrics<B: BlobStore + 'static>(
    State(state): State<AppState<B>>,
) -> impl IntoResponse {
    match state.metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => AppError::Internal(format!("failed to encode Prometheus metrics: {e}"))
            .into_response(),
    }
}

/// Liveness probe. Always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. The store is stateless and remote, so the service is
/// ready as soon as it is listening.
async fn readiness() -> &'static str {
    "ready"
}
