//! Wire types for the MCP endpoint.
//!
//! The request argument types deserialise leniently (the library validates
//! the spell), while the `*Schema` types exist only to generate the tool's
//! JSON Schema with the constraints a client should respect.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use spellcard_lib::{School, SpellData};

// ============================================================================
// JSON-RPC ENVELOPES
// ============================================================================

/// An incoming JSON-RPC request or notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,

    /// Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,

    pub method: String,

    #[serde(default)]
    pub params: Option<Value>,
}

// ============================================================================
// TOOL INPUTS
// ============================================================================

/// Arguments of `generate_spell_card_stream`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCardArgs {
    /// Generator name; `"plain"` when omitted.
    #[serde(default)]
    pub generator: Option<String>,

    pub spell_data: SpellData,

    /// Client-supplied metadata. Logged, otherwise ignored.
    #[serde(default, alias = "_meta")]
    pub metadata: Option<Value>,
}

/// `tools/call` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,

    #[serde(default)]
    pub arguments: Option<Value>,

    #[serde(default, rename = "_meta")]
    pub meta: Option<Value>,
}

/// Schema of a spell as advertised to MCP clients.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SpellDataSchema {
    /// Spell name, at most 23 characters
    #[schemars(length(min = 1, max = 23))]
    pub title: String,

    /// e.g. "1 action"
    pub casting_time: String,

    /// e.g. "60 feet"
    pub range: String,

    /// e.g. "V, S, M (a pinch of sulfur)"
    pub components: String,

    /// e.g. "Instantaneous"
    pub duration: String,

    /// Rules text, at most 650 characters
    #[schemars(length(min = 1, max = 650))]
    pub description: String,

    pub school: School,

    /// Spell level; 0 is a cantrip
    #[schemars(range(min = 0, max = 9))]
    pub level: u8,
}

/// Schema of the `generate_spell_card_stream` arguments.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GenerateCardSchema {
    /// Card generator to use
    pub generator: Option<String>,

    pub spell_data: SpellDataSchema,

    /// Optional client metadata, ignored by the server
    pub metadata: Option<Value>,
}

// ============================================================================
// TOOL OUTPUTS
// ============================================================================

/// Entry of the `list_tools` result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Parameters of a `tool.progress` notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressParams {
    pub progress: u8,
    pub message: String,
    pub status: String,

    /// Base64 image, on the completed frame only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardPayload>,
}

/// The finished card inside the completed frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardPayload {
    pub title: String,
    pub level: u8,
    pub format: String,
    pub image_data: String,
}
