//! Job completion callbacks.
//!
//! A finished job POSTs a small JSON document to the caller-supplied URL.
//! Delivery is attempted once; failures are reported to the caller of
//! [`CallbackNotifier::notify`] and never retried.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub use reqwest::Url;

/// Default timeout for a callback POST.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of a callback POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallbackPayload {
    /// The card was rendered and stored.
    Ready {
        title: String,
        level: u8,
        filename: String,
        url: String,
    },
    /// Rendering or storing failed.
    Failed {
        title: String,
        level: u8,
        reason: String,
    },
}

impl CallbackPayload {
    pub fn status(&self) -> &'static str {
        match self {
            CallbackPayload::Ready { .. } => "ready",
            CallbackPayload::Failed { .. } => "failed",
        }
    }
}

/// Boxed future returned by [`CallbackNotifier::notify`].
pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Delivers callback payloads.
pub trait CallbackNotifier: Send + Sync {
    fn notify<'a>(&'a self, url: &'a Url, payload: &'a CallbackPayload) -> NotifyFuture<'a>;
}

/// POSTs payloads as JSON with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpCallbackNotifier {
    client: Client,
}

impl HttpCallbackNotifier {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl CallbackNotifier for HttpCallbackNotifier {
    fn notify<'a>(&'a self, url: &'a Url, payload: &'a CallbackPayload) -> NotifyFuture<'a> {
        Box::pin(async move {
            let delivery_error = |message: String| Error::CallbackDelivery {
                url: url.to_string(),
                message,
            };

            let response = self
                .client
                .post(url.clone())
                .json(payload)
                .send()
                .await
                .map_err(|e| delivery_error(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(delivery_error(format!("receiver answered {}", status)));
            }
            debug!(%url, status = payload.status(), "callback delivered");
            Ok(())
        })
    }
}

/// Parse and check a callback URL. Only `http` and `https` are accepted.
pub fn parse_callback_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        Error::validation("callback_url", format!("'{}' is not a valid URL: {}", raw, e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::validation(
            "callback_url",
            format!("unsupported scheme '{}'; use http or https", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ready_payload_shape() {
        let payload = CallbackPayload::Ready {
            title: "Acid Splash".to_string(),
            level: 0,
            filename: "L0.Acid-Splash.jpg".to_string(),
            url: "/cards/plain/L0.Acid-Splash.jpg".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "status": "ready",
                "title": "Acid Splash",
                "level": 0,
                "filename": "L0.Acid-Splash.jpg",
                "url": "/cards/plain/L0.Acid-Splash.jpg"
            })
        );
    }

    #[test]
    fn failed_payload_shape() {
        let payload = CallbackPayload::Failed {
            title: "Fireball".to_string(),
            level: 3,
            reason: "disk full".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["reason"], "disk full");
        assert_eq!(payload.status(), "failed");
    }

    #[test]
    fn callback_url_must_be_http() {
        assert!(parse_callback_url("http://localhost:9000/hook").is_ok());
        assert!(parse_callback_url(" https://example.com/cb ").is_ok());

        for bad in ["ftp://example.com/cb", "not a url", ""] {
            match parse_callback_url(bad).unwrap_err() {
                Error::Validation { field, .. } => assert_eq!(field, "callback_url"),
                other => panic!("unexpected error for {:?}: {:?}", bad, other),
            }
        }
    }

    #[tokio::test]
    async fn unreachable_receiver_is_a_delivery_error() {
        let notifier = HttpCallbackNotifier::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) is closed on test machines.
        let url = Url::parse("http://127.0.0.1:9/callback").unwrap();
        let payload = CallbackPayload::Failed {
            title: "Light".to_string(),
            level: 0,
            reason: "test".to_string(),
        };
        let err = notifier.notify(&url, &payload).await.unwrap_err();
        assert!(matches!(err, Error::CallbackDelivery { .. }));
    }
}
