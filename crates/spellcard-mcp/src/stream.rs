//! Turning progress events into JSON-RPC frames.
//!
//! Each [`ProgressEvent`] becomes one `tool.progress` notification. The 100%
//! frame is marked `completed` and carries the image twice: as `data` and
//! inside `card`. A render error, or a producer that stops before 100%,
//! ends the stream with an error frame for the request id.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{debug, warn};

use spellcard_lib::{ProgressEvent, ProgressReceiver};

use crate::types::{CardPayload, ProgressParams};
use crate::Error;

/// JSON-RPC method of progress notifications.
pub const PROGRESS_METHOD: &str = "tool.progress";

/// `format` reported for finished cards.
pub const CARD_FORMAT: &str = "jpeg";

/// A stream of serialised JSON-RPC frames.
pub type FrameStream = BoxStream<'static, Value>;

/// Card identity attached to the completed frame.
#[derive(Debug, Clone)]
pub struct CardInfo {
    pub title: String,
    pub level: u8,
}

/// A successful JSON-RPC response.
pub fn result_frame(id: Option<Value>, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

/// A JSON-RPC error response.
pub fn error_frame(id: Option<Value>, error: &Error) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": error })
}

/// Build the notification for one progress event.
pub fn progress_frame(event: &ProgressEvent, card: &CardInfo) -> Value {
    let params = match &event.image {
        Some(image) if event.is_final() => {
            let encoded = BASE64.encode(image);
            ProgressParams {
                progress: event.percent,
                message: event.message.clone(),
                status: "completed".to_string(),
                data: Some(encoded.clone()),
                card: Some(CardPayload {
                    title: card.title.clone(),
                    level: card.level,
                    format: CARD_FORMAT.to_string(),
                    image_data: encoded,
                }),
            }
        }
        _ => ProgressParams {
            progress: event.percent,
            message: event.message.clone(),
            status: "in_progress".to_string(),
            data: None,
            card: None,
        },
    };
    json!({ "jsonrpc": "2.0", "method": PROGRESS_METHOD, "params": params })
}

/// Frame every event received on `events`.
///
/// Dropping the returned stream drops the receiver, which stops the
/// producer at its next send.
pub fn progress_frames(
    id: Option<Value>,
    card: CardInfo,
    mut events: ProgressReceiver,
) -> FrameStream {
    async_stream::stream! {
        let mut completed = false;
        while let Some(event) = events.recv().await {
            match event {
                Ok(event) => {
                    completed = event.is_final();
                    yield progress_frame(&event, &card);
                    if completed {
                        break;
                    }
                }
                Err(err) => {
                    warn!(title = %card.title, error = %err, "card stream failed");
                    yield error_frame(id.clone(), &Error::render_failed(err.to_string()));
                    return;
                }
            }
        }
        if completed {
            debug!(title = %card.title, "card stream completed");
        } else {
            let error = Error::render_failed("render stopped before completion");
            yield error_frame(id.clone(), &error);
        }
    }
    .boxed()
}
