//! Spell card generator HTTP service.
//!
//! # Endpoints
//!
//! - `POST /v1/generate` - queue a card render, optionally with a callback URL
//! - `GET /v1/generators` - registered generators
//! - `GET /cards/<generator>/<filename>` - rendered card files
//! - `POST /mcp` - MCP JSON-RPC endpoint (JSON or SSE responses)
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use spellcard_lib::Error as LibError;
use spellcard_mcp::McpServer;
use spellcard_service_shared::{
    from_lib_error, health_live, health_ready, metrics_handler, record_generation_accepted,
    record_request_rejected, AppState, GenerateRequest, GeneratorListing, JobAccepted,
    MetricsConfig, MetricsLayer, ProblemDetails, RequestId, ServiceResponse,
};

/// Label used for REST requests in business metrics.
const TRANSPORT: &str = "rest";

/// Build the full application router.
pub fn app(state: AppState, metrics: &MetricsConfig) -> Router {
    let cards_prefix = state.dispatcher().store().url_prefix().to_string();
    let cards = ServeDir::new(state.dispatcher().store().root());
    let mcp = spellcard_mcp::http::router(Arc::new(McpServer::new(state.dispatcher().clone())));

    let mut router = Router::new()
        .route("/v1/generate", post(generate_handler))
        .route("/v1/generators", get(generators_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready));
    if metrics.enabled {
        router = router.route(&metrics.path, get(metrics_handler));
    }

    router
        .nest_service(&cards_prefix, cards)
        .with_state(state)
        .merge(mcp)
        .layer(MetricsLayer)
}

/// Handle `POST /v1/generate`.
///
/// Validation and generator lookup happen before anything is queued; the
/// render itself runs in the background and reports through the callback.
async fn generate_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<ServiceResponse<JobAccepted>, ProblemDetails> {
    let request_id = request_id.as_str();
    let Json(request) = payload.map_err(|rejection| {
        record_request_rejected("malformed_body", TRANSPORT);
        ProblemDetails::bad_request(rejection.body_text(), request_id)
    })?;

    let prepared = request.prepare(request_id).map_err(|problem| {
        record_request_rejected("validation_error", TRANSPORT);
        *problem
    })?;

    let handle = state
        .dispatcher()
        .submit(prepared.spell, &prepared.generator, prepared.callback_url)
        .map_err(|e| {
            let reason = match &e {
                LibError::GeneratorNotFound { .. } => "unknown_generator",
                _ => "internal_error",
            };
            warn!(request_id, error = %e, "generation request rejected");
            record_request_rejected(reason, TRANSPORT);
            from_lib_error(&e, request_id)
        })?;

    record_generation_accepted(&prepared.generator, TRANSPORT);
    info!(
        request_id,
        job_id = %handle.id(),
        generator = %prepared.generator,
        "generation request accepted"
    );
    Ok(ServiceResponse::new(JobAccepted::queued(
        handle.title(),
        handle.id().to_string(),
    )))
}

/// Handle `GET /v1/generators`.
async fn generators_handler(State(state): State<AppState>) -> ServiceResponse<GeneratorListing> {
    let listing = state
        .registry()
        .names()
        .into_iter()
        .map(|name| (name, "available".to_string()))
        .collect();
    ServiceResponse::new(listing)
}
