use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the spell card library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A spell field (or another request field) failed validation.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Raised when a generator name is not present in the registry.
    #[error("unknown generator '{name}'{}", format_available(.available))]
    GeneratorNotFound {
        name: String,
        available: Vec<String>,
    },

    /// Raised when a formatter could not produce an image.
    #[error("generator {generator} failed to render card: {message}")]
    Render { generator: String, message: String },

    /// Raised when posting a job result to a callback URL fails.
    #[error("callback to {url} failed: {message}")]
    CallbackDelivery { url: String, message: String },

    /// Raised when a template image exists but cannot be decoded.
    #[error("failed to load template from {path}: {message}")]
    TemplateLoad { path: PathBuf, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Build a validation error for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Build a render error attributed to `generator`.
    pub fn render(generator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            generator: generator.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::GeneratorNotFound { .. }
        )
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(
            ". Available generators: {}",
            available
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
