//! Response bodies for successful HTTP responses.

use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Wrapper for successful responses.
///
/// The body is exactly the payload; the content type travels in the
/// `Content-Type` header.
///
/// # Example
///
/// ```
/// use spellcard_service_shared::{JobAccepted, ServiceResponse};
///
/// let response = ServiceResponse::new(JobAccepted::queued("Acid Splash", "0192-..."));
/// assert_eq!(response.content_type, "application/json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceResponse<T> {
    pub data: T,

    #[serde(skip, default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: default_content_type(),
        }
    }

    pub fn with_content_type(data: T, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        let mut response = Json(&self.data).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        response
    }
}

/// Body of a `POST /v1/generate` acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAccepted {
    /// Always "queued".
    pub status: String,
    pub title: String,
    pub job_id: String,
}

impl JobAccepted {
    pub fn queued(title: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            status: "queued".to_string(),
            title: title.into(),
            job_id: job_id.into(),
        }
    }
}

/// Body of `GET /v1/generators`: generator name to availability.
pub type GeneratorListing = BTreeMap<String, String>;
