//! The tool catalogue.
//!
//! The server exposes a single tool, `generate_spell_card_stream`. Its input
//! schema is generated from [`GenerateCardSchema`] and then narrowed with the
//! generator names actually present in the registry.

use schemars::schema_for;
use serde_json::{json, Value};

use spellcard_lib::{FormatterRegistry, DEFAULT_GENERATOR};

use crate::types::{GenerateCardSchema, ToolDescriptor};
use crate::{Error, Result};

/// Name of the streaming generation tool.
pub const GENERATE_TOOL: &str = "generate_spell_card_stream";

/// Describe the generation tool for `registry`.
pub fn generate_tool(registry: &FormatterRegistry) -> Result<ToolDescriptor> {
    let mut schema = serde_json::to_value(schema_for!(GenerateCardSchema))
        .map_err(|e| Error::internal(format!("failed to serialise tool schema: {}", e)))?;

    let generator = json!({
        "type": "string",
        "description": "Card generator to use",
        "enum": registry.names(),
        "default": DEFAULT_GENERATOR,
    });
    match schema.pointer_mut("/properties") {
        Some(Value::Object(properties)) => {
            properties.insert("generator".to_string(), generator);
        }
        _ => return Err(Error::internal("tool schema has no properties")),
    }
    match schema.get_mut("required") {
        Some(Value::Array(required)) => required.insert(0, json!("generator")),
        _ => {
            schema["required"] = json!(["generator", "spell_data"]);
        }
    }

    let generators = registry
        .iter()
        .map(|(name, formatter)| format!("'{}' ({})", name, formatter.description()))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(ToolDescriptor {
        name: GENERATE_TOOL.to_string(),
        description: format!(
            "Render a D&D spell card and stream progress notifications (10, 30, 80, 100%). \
             The final notification carries the base64 JPEG. Generators: {}",
            generators
        ),
        input_schema: schema,
    })
}

/// Result of `list_tools`.
pub fn list_tools(registry: &FormatterRegistry) -> Result<Value> {
    let tool = generate_tool(registry)?;
    Ok(json!({ "tools": [tool] }))
}
