//! MCP (Model Context Protocol) adapter for the spell card generator
//!
//! This crate exposes streaming spell card generation to AI assistants via
//! JSON-RPC 2.0. It is transport-agnostic at its core and ships an axum
//! router for the HTTP transport; the CLI wraps the same server in a stdio
//! loop.
//!
//! # Architecture
//!
//! - `server`: message dispatch (`initialize`, `list_tools`, tool calls)
//! - `tools`: the tool catalogue and its JSON Schema
//! - `stream`: framing of progress events as `tool.progress` notifications
//! - `http`: `POST /mcp` with JSON or SSE responses
//! - `error`: JSON-RPC error objects

#![deny(warnings)]

pub mod error;
pub mod http;
pub mod server;
pub mod stream;
pub mod tools;
pub mod types;

pub use error::{Error, Result};
pub use server::{McpServer, Reply, PROTOCOL_VERSION};
pub use stream::{FrameStream, PROGRESS_METHOD};
pub use tools::GENERATE_TOOL;
