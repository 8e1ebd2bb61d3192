// Client configuration for talking to the listing source

use crate::error::ConfigError;
use ::config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

// `STAYWISE_BASE_URL`, `STAYWISE_TIMEOUT_MS`, `STAYWISE_DEBOUNCE_MS`, ...
pub const ENV_PREFIX: &str = "STAYWISE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    // Minimum gap between two accepted scroll-intersection signals
    pub debounce_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            debounce_ms: 200,
            user_agent: format!("staywise-listings/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    // Tests hand in an `Environment` backed by a map instead of the process env
    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(environment.try_parsing(true))
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let mut config = settings
            .try_deserialize::<ClientConfig>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let base_url = match config.base_url.trim() {
            "" => DEFAULT_BASE_URL.to_string(),
            trimmed => trimmed.trim_end_matches('/').to_string(),
        };
        config.base_url = base_url;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base URL {}: {}", self.base_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "unsupported scheme {} in base URL",
                url.scheme()
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout must be positive".to_string()));
        }
        Ok(())
    }

    // Join the base URL and a resource path, tolerating slashes on either side
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
