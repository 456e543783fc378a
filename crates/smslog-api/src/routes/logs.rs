//! `GET /v1/logs/:period` returns one period's log as JSON.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use smslog_core::{LogRecord, PeriodKey, VersionToken};
use smslog_store::BlobStore;

use crate::error::AppError;
use crate::state::AppState;

/// A period's log as returned to API clients.
#[derive(Debug, Serialize)]
pub struct LogView {
    pub period: PeriodKey,
    /// Current revision, or `null` when the log does not exist yet.
    pub version: Option<VersionToken>,
    pub records: Vec<LogRecord>,
}

pub fn router<B: BlobStore + 'static>() -> Router<AppState<B>> {
    Router::new().route("/v1/logs/:period", get(get_log::<B>))
}

async fn get_log<B: BlobStore + 'static>(
    State(state): State<AppState<B>>,
    Path(period): Path<String>,
) -> Result<Json<LogView>, AppError> {
    let period = PeriodKey::new(period)?;
    let blob = state.log.read(&period).await?;
    Ok(Json(LogView {
        period,
        version: blob.version,
        records: blob.records,
    }))
}
