//! JSON-RPC request handling.
//!
//! [`McpServer`] is transport-agnostic: it turns one incoming message into a
//! [`Reply`], which the HTTP adapter writes as JSON or SSE and the stdio
//! adapter writes as newline-delimited JSON.

use serde_json::{json, Value};
use tracing::{debug, info};

use spellcard_lib::{Dispatcher, SpellRecord, DEFAULT_GENERATOR};

use crate::stream::{error_frame, progress_frames, result_frame, CardInfo, FrameStream};
use crate::tools::{list_tools, GENERATE_TOOL};
use crate::types::{GenerateCardArgs, JsonRpcRequest, ToolCallParams};
use crate::Error;

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "spellcard";

/// Buffered progress events per stream.
const STREAM_CAPACITY: usize = 4;

/// What to send back for one message.
pub enum Reply {
    /// A single JSON-RPC response.
    Single(Value),
    /// Progress notifications followed by completion or an error frame.
    Stream(FrameStream),
    /// Nothing; the message was a notification.
    Empty,
}

impl Reply {
    fn error(id: Option<Value>, error: Error) -> Self {
        Reply::Single(error_frame(id, &error))
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Single(value) => f.debug_tuple("Single").field(value).finish(),
            Reply::Stream(_) => f.write_str("Stream(..)"),
            Reply::Empty => f.write_str("Empty"),
        }
    }
}

/// Shared MCP request handler.
#[derive(Debug, Clone)]
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle a raw message body.
    pub fn handle_text(&self, body: &str) -> Reply {
        match serde_json::from_str::<Value>(body) {
            Ok(message) => self.handle(message),
            Err(e) => Reply::error(None, Error::parse_error(e.to_string())),
        }
    }

    /// Handle a parsed message. Must be called within a tokio runtime.
    pub fn handle(&self, message: Value) -> Reply {
        let id = message.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => return Reply::error(id, Error::invalid_request(e.to_string())),
        };
        if let Some(version) = request.jsonrpc.as_deref() {
            if version != "2.0" {
                return Reply::error(
                    request.id,
                    Error::invalid_request(format!("unsupported jsonrpc version '{}'", version)),
                );
            }
        }

        debug!(method = %request.method, "mcp request");
        let id = request.id;
        match request.method.as_str() {
            "initialize" => Reply::Single(result_frame(id, initialize_result())),
            "ping" => Reply::Single(result_frame(id, json!({}))),
            method if method.starts_with("notifications/") && id.is_none() => Reply::Empty,
            "list_tools" | "tools/list" => match list_tools(self.dispatcher.registry()) {
                Ok(tools) => Reply::Single(result_frame(id, tools)),
                Err(e) => Reply::error(id, e),
            },
            GENERATE_TOOL => self.generate(id, request.params),
            "tools/call" => self.tool_call(id, request.params),
            other => Reply::error(id, Error::method_not_found(other)),
        }
    }

    fn tool_call(&self, id: Option<Value>, params: Option<Value>) -> Reply {
        let params = match params.map(serde_json::from_value::<ToolCallParams>).transpose() {
            Ok(Some(params)) => params,
            Ok(None) => {
                return Reply::error(id, Error::invalid_params("missing tool call parameters"))
            }
            Err(e) => return Reply::error(id, Error::invalid_params(e.to_string())),
        };
        if let Some(meta) = &params.meta {
            debug!(%meta, "tool call metadata");
        }
        if params.name != GENERATE_TOOL {
            let message = format!("Unknown tool: {}", params.name);
            return Reply::error(id, Error::invalid_params(message));
        }
        self.generate(id, params.arguments)
    }

    /// Validate the arguments and start streaming.
    ///
    /// Generator and spell errors are answered immediately as a single error
    /// response; no stream is opened for them.
    fn generate(&self, id: Option<Value>, params: Option<Value>) -> Reply {
        let args: GenerateCardArgs = match params {
            Some(params) => match serde_json::from_value(params) {
                Ok(args) => args,
                Err(e) => return Reply::error(id, Error::invalid_params(e.to_string())),
            },
            None => return Reply::error(id, Error::invalid_params("missing spell_data")),
        };
        if let Some(metadata) = &args.metadata {
            debug!(%metadata, "tool call metadata");
        }

        let generator = args.generator.as_deref().unwrap_or(DEFAULT_GENERATOR);
        let registry = self.dispatcher.registry();
        if !registry.contains(generator) {
            return Reply::error(id, Error::invalid_generator(generator, &registry.names()));
        }

        let spell = match SpellRecord::new(args.spell_data) {
            Ok(spell) => spell,
            Err(e) => return Reply::error(id, Error::from(e)),
        };
        let card = CardInfo {
            title: spell.title().to_string(),
            level: spell.level(),
        };

        match self.dispatcher.stream(spell, generator, STREAM_CAPACITY) {
            Ok(events) => {
                info!(generator, title = %card.title, "streaming card generation");
                Reply::Stream(progress_frames(id, card, events))
            }
            Err(e) => Reply::error(id, Error::from(e)),
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
        "capabilities": { "tools": {} }
    })
}
