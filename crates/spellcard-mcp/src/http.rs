//! Streamable HTTP transport for the MCP endpoint.
//!
//! `POST /mcp` answers plain requests with a JSON body and streaming tool
//! calls with `text/event-stream`, one JSON-RPC frame per `data:` line.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;

use crate::server::{McpServer, Reply};

/// Path the MCP endpoint is mounted at.
pub const MCP_PATH: &str = "/mcp";

/// Router serving the MCP endpoint.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route(MCP_PATH, post(handle_mcp))
        .with_state(server)
}

/// Handle `POST /mcp`.
///
/// The body is read as text so malformed JSON can be answered with a
/// JSON-RPC parse error instead of an HTTP rejection.
pub async fn handle_mcp(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_text(&body) {
        Reply::Single(frame) => Json(frame).into_response(),
        Reply::Stream(frames) => {
            let events = frames
                .map(|frame| Ok::<Event, Infallible>(Event::default().data(frame.to_string())));
            Sse::new(events).keep_alive(KeepAlive::default()).into_response()
        }
        Reply::Empty => StatusCode::ACCEPTED.into_response(),
    }
}
