//! Test utilities for handler testing.
//!
//! State is built over a caller-owned temporary directory so each test gets
//! its own card store.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use spellcard_lib::{CallbackNotifier, CallbackPayload, FormatterRegistry, NotifyFuture, Url};

use crate::{AppState, ServiceConfig};

/// Configuration writing cards under `root/cards`.
pub fn test_config(root: &Path) -> ServiceConfig {
    ServiceConfig {
        port: 0,
        cards_dir: root.join("cards"),
        templates_dir: None,
        callback_timeout: Duration::from_secs(2),
    }
}

/// State with the built-in generators and a real HTTP callback client.
///
/// # Panics
///
/// Panics if the state cannot be built, which indicates a broken test
/// environment.
pub fn test_state(root: &Path) -> AppState {
    AppState::from_config(test_config(root))
        .unwrap_or_else(|e| panic!("failed to build test state under {:?}: {}", root, e))
}

/// Callback notifier that forwards every delivery to a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(Url, CallbackPayload)>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(Url, CallbackPayload)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl CallbackNotifier for ChannelNotifier {
    fn notify<'a>(&'a self, url: &'a Url, payload: &'a CallbackPayload) -> NotifyFuture<'a> {
        let _ = self.tx.send((url.clone(), payload.clone()));
        Box::pin(async { Ok(()) })
    }
}

/// State whose callbacks are captured instead of sent.
pub fn test_state_with_channel(
    root: &Path,
) -> (AppState, mpsc::UnboundedReceiver<(Url, CallbackPayload)>) {
    let config = test_config(root);
    std::fs::create_dir_all(&config.cards_dir)
        .unwrap_or_else(|e| panic!("failed to create {:?}: {}", config.cards_dir, e));
    let registry = FormatterRegistry::builtin(None)
        .unwrap_or_else(|e| panic!("failed to build registry: {}", e));
    let (notifier, rx) = ChannelNotifier::new();
    let state = AppState::from_components(config, Arc::new(registry), Arc::new(notifier));
    (state, rx)
}

/// A valid `spell_data` object (Acid Splash, cantrip).
pub fn acid_splash() -> Value {
    json!({
        "title": "Acid Splash",
        "casting_time": "1 action",
        "range": "60 feet",
        "components": "V, S",
        "duration": "Instantaneous",
        "description": "You hurl a bubble of acid. Choose one creature you can see within range, or choose two creatures you can see within range that are within 5 feet of each other.",
        "school": "Conjuration",
        "level": 0
    })
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}
