//! Client configuration: API key and base URL.
//!
//! Values are passed explicitly to `HolodexClient::new`. `from_env` is a
//! convenience for binaries that keep the key in `HOLODEX_API_KEY`.

use figment::{providers::Env, Figment};
use redact::Secret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://holodex.net/api/v2";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_key: Secret<String>,
    /// Absolute URL that endpoint paths are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: default_base_url(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        parse_base_url(base_url)?;
        self.base_url = base_url.to_string();
        Ok(self)
    }

    /// Load from `HOLODEX_API_KEY` and, optionally, `HOLODEX_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(Figment::new().merge(Env::prefixed("HOLODEX_")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: ClientConfig = figment.extract().map_err(Box::new)?;
        parse_base_url(&config.base_url)?;
        Ok(config)
    }
}

/// Parse `raw` and make sure endpoint paths can be appended to it.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL cannot carry path segments".to_string(),
        });
    }
    Ok(url)
}
