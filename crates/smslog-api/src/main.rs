//! # smslog-api: Binary Entry Point
//!
//! Starts the SMS webhook server backed by the GitHub log store.
//! Binds to configurable port (default 8080).

use smslog_api::state::{AppConfig, AppState};
use smslog_store::GitHubConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env();
    let github = GitHubConfig::from_env().map_err(|e| {
        tracing::error!("GitHub store configuration invalid: {e}");
        e
    })?;
    tracing::info!(
        repository = %github.repository,
        branch = %github.branch,
        log_dir = %github.log_dir,
        key_style = %github.key_style,
        sender_filter = config.allowed_sender.is_some(),
        "log store configured"
    );

    let log = smslog_store::connect(&github)?;
    let port = config.port;
    let app = smslog_api::app(AppState::new(log, config)?);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("smslog API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Structured tracing; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
