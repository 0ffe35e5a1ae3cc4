//! Health check handlers for Kubernetes probes.
//!
//! `/health/live` answers as long as the process runs. `/health/ready`
//! additionally requires at least one registered generator and a writable
//! card directory.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Registered generator names (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generators: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<i64>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            generators: None,
            uptime_seconds: None,
        }
    }

    pub fn ready(
        service: &str,
        version: &str,
        generators: Vec<String>,
        uptime_seconds: i64,
    ) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            generators: Some(generators),
            uptime_seconds: Some(uptime_seconds),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            generators: None,
            uptime_seconds: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"spellcard-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"spellcard-service-shared","version":"0.1.0","generators":["plain","tornioduva"],"uptime_seconds":42}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let status = readiness(&state);
    let code = if status.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status)).into_response()
}

fn readiness(state: &AppState) -> HealthStatus {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    if state.registry().is_empty() {
        return HealthStatus::not_ready(service, version, "no generators registered");
    }
    let cards_dir = &state.config().cards_dir;
    match std::fs::metadata(cards_dir) {
        Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => {}
        _ => {
            tracing::warn!(path = %cards_dir.display(), "card directory is not writable");
            return HealthStatus::not_ready(service, version, "card directory unavailable");
        }
    }

    HealthStatus::ready(
        service,
        version,
        state.registry().names(),
        state.uptime_seconds(),
    )
}
