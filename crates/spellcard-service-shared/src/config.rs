//! Service configuration from environment variables.
//!
//! - `SERVICE_PORT`: HTTP port (default: 8000)
//! - `SPELLCARD_CARDS_DIR`: where rendered cards are written (default: `cards`)
//! - `SPELLCARD_TEMPLATES_DIR`: directory with `<generator>.png|jpg`
//!   backgrounds (default: unset, procedural templates)
//! - `SPELLCARD_CALLBACK_TIMEOUT_SECS`: callback request timeout (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use spellcard_lib::DEFAULT_CALLBACK_TIMEOUT;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CARDS_DIR: &str = "cards";

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceConfig {
    pub port: u16,
    pub cards_dir: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub callback_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cards_dir: PathBuf::from(DEFAULT_CARDS_DIR),
            templates_dir: None,
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Unset and blank values
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("SERVICE_PORT") {
            config.port = raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                var: "SERVICE_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(dir) = get("SPELLCARD_CARDS_DIR") {
            config.cards_dir = PathBuf::from(dir);
        }
        config.templates_dir = get("SPELLCARD_TEMPLATES_DIR").map(PathBuf::from);
        if let Some(raw) = get("SPELLCARD_CALLBACK_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                var: "SPELLCARD_CALLBACK_TIMEOUT_SECS",
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "SPELLCARD_CALLBACK_TIMEOUT_SECS",
                    value: raw,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.callback_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
