//! Connection settings loaded from serde sources or the environment.

use serde::Deserialize;
use thiserror::Error;

use crate::http::Headers;

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

/// Settings for one `Connection`.
///
/// `headers` are merged over the JSON defaults when the connection is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub base_url: String,
    #[serde(default)]
    pub headers: Headers,
}

impl ConnectionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Headers::new(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var(BASE_URL_ENV).map_err(|_| ConfigError::MissingEnv(BASE_URL_ENV))?;
        Ok(Self::new(base_url))
    }
}
