//! Spell card generator HTTP service.
//!
//! # Configuration
//!
//! - `SERVICE_PORT` - HTTP port (default: 8000)
//! - `SPELLCARD_CARDS_DIR` - output directory for rendered cards (default: `cards`)
//! - `SPELLCARD_TEMPLATES_DIR` - optional template image directory
//! - `SPELLCARD_CALLBACK_TIMEOUT_SECS` - callback timeout (default: 10)
//! - `RUST_LOG` - log level (default: info)
//! - `LOG_FORMAT` - log format: json (default) or text
//! - `METRICS_ENABLED` / `METRICS_PATH` - Prometheus endpoint

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};

use spellcard_service::app;
use spellcard_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig, ServiceConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env().with_service("spellcard-service");
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("logging already initialised: {}", e);
    }

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "continuing without metrics");
    }

    let config = ServiceConfig::from_env().context("invalid service configuration")?;
    let port = config.port;
    info!(
        port,
        cards_dir = %config.cards_dir.display(),
        templates_dir = ?config.templates_dir,
        "starting spell card service"
    );

    let state = AppState::from_config(config).context("failed to initialise application state")?;
    let app = app(state, &metrics_config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
