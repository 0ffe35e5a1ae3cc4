//! Application state shared by the HTTP handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use spellcard_lib::{
    CallbackNotifier, CardStore, Dispatcher, Error as LibError, FormatterRegistry,
    HttpCallbackNotifier,
};

use crate::ServiceConfig;

/// Error during application state initialisation.
#[derive(Debug, Error)]
pub enum AppStateError {
    /// A template in the configured directory could not be loaded.
    #[error("failed to load formatters: {0}")]
    Registry(#[source] LibError),

    /// The callback HTTP client could not be built.
    #[error("failed to build callback client: {0}")]
    CallbackClient(#[source] LibError),

    /// The card directory could not be created.
    #[error("card directory {path} is not usable: {source}")]
    CardsDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; share it via axum's `State` extractor.
///
/// ```ignore
/// use axum::{extract::State, routing::get, Router};
/// use spellcard_service_shared::{AppState, ServiceConfig};
///
/// async fn handler(State(state): State<AppState>) -> String {
///     state.dispatcher().registry().names().join(",")
/// }
///
/// let state = AppState::from_config(ServiceConfig::from_env()?)?;
/// let app = Router::new().route("/names", get(handler)).with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServiceConfig,
    dispatcher: Dispatcher,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Build the registry, card store and callback client from `config`.
    ///
    /// Templates are loaded here, once; a broken template file fails startup.
    pub fn from_config(config: ServiceConfig) -> Result<Self, AppStateError> {
        std::fs::create_dir_all(&config.cards_dir).map_err(|source| AppStateError::CardsDir {
            path: config.cards_dir.display().to_string(),
            source,
        })?;

        tracing::info!(
            templates = ?config.templates_dir,
            "loading formatters"
        );
        let registry = FormatterRegistry::builtin(config.templates_dir.as_deref())
            .map_err(AppStateError::Registry)?;

        let notifier = HttpCallbackNotifier::new(config.callback_timeout)
            .map_err(AppStateError::CallbackClient)?;

        Ok(Self::from_components(
            config.clone(),
            Arc::new(registry),
            Arc::new(notifier),
        ))
    }

    /// Assemble state from pre-built parts. Useful for tests that need a
    /// custom notifier or registry.
    pub fn from_components(
        config: ServiceConfig,
        registry: Arc<FormatterRegistry>,
        notifier: Arc<dyn CallbackNotifier>,
    ) -> Self {
        let store = CardStore::new(config.cards_dir.clone());
        Self {
            inner: Arc::new(AppStateInner {
                dispatcher: Dispatcher::new(registry, store, notifier),
                config,
                started_at: Utc::now(),
            }),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn registry(&self) -> &FormatterRegistry {
        self.inner.dispatcher.registry()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Whole seconds since the state was built.
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.inner.started_at).num_seconds().max(0)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("generators", &self.registry().names())
            .field("cards_dir", &self.inner.config.cards_dir)
            .field("started_at", &self.inner.started_at)
            .finish()
    }
}
