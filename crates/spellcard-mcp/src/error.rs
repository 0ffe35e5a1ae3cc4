//! JSON-RPC error objects for the MCP endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use spellcard_lib::Error as LibError;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters, including spell validation failures.
pub const INVALID_PARAMS: i32 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i32 = -32603;
/// The card could not be rendered.
pub const RENDER_FAILED: i32 = -32000;

/// A JSON-RPC 2.0 error object
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
#[error("{message}")]
pub struct Error {
    pub code: i32,

    pub message: String,

    /// Additional machine-readable context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Error {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR, format!("Parse error: {}", reason.into()))
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, format!("Invalid Request: {}", reason.into()))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, format!("Invalid params: {}", reason.into()))
    }

    /// Unknown generator, listing the registered ones.
    pub fn invalid_generator(name: &str, available: &[String]) -> Self {
        Self::new(INVALID_PARAMS, format!("Invalid generator: {}", name))
            .with_data(json!({ "generator": name, "available": available }))
    }

    pub fn render_failed(reason: impl Into<String>) -> Self {
        Self::new(RENDER_FAILED, format!("Card generation failed: {}", reason.into()))
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, format!("Internal error: {}", reason.into()))
    }
}

impl From<&LibError> for Error {
    fn from(error: &LibError) -> Self {
        match error {
            LibError::Validation { field, message } => {
                Error::invalid_params(format!("{}: {}", field, message))
                    .with_data(json!({ "field": field }))
            }
            LibError::GeneratorNotFound { name, available } => {
                Error::invalid_generator(name, available)
            }
            other => Error::render_failed(other.to_string()),
        }
    }
}

impl From<LibError> for Error {
    fn from(error: LibError) -> Self {
        Error::from(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_not_found_names_the_method() {
        let err = Error::method_not_found("invalid_method");
        assert_eq!(err.code, -32601);
        assert!(err.message.contains("Method not found"));
        assert!(err.message.contains("invalid_method"));
    }

    #[test]
    fn generator_not_found_maps_to_invalid_params() {
        let lib = LibError::GeneratorNotFound {
            name: "invalid_generator".to_string(),
            available: vec!["plain".to_string(), "tornioduva".to_string()],
        };
        let err = Error::from(&lib);
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("Invalid generator"));
        assert_eq!(err.data.unwrap()["available"][1], "tornioduva");
    }

    #[test]
    fn validation_errors_name_the_field() {
        let err = Error::from(LibError::validation("level", "42 is out of range"));
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("level"));
        assert_eq!(err.data.unwrap()["field"], "level");
    }

    #[test]
    fn render_errors_use_server_code() {
        let err = Error::from(LibError::render("plain", "encoder failed"));
        assert_eq!(err.code, RENDER_FAILED);
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let json = serde_json::to_string(&Error::parse_error("eof")).unwrap();
        assert!(!json.contains("data"));
        assert!(json.contains("-32700"));
    }
}
