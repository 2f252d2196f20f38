//! Configuration for EPR Client

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Environment variable holding the registry base URL
pub const ENV_URL: &str = "EPR_URL";
/// Environment variable holding the call timeout in milliseconds
pub const ENV_TIMEOUT_MS: &str = "EPR_TIMEOUT_MS";
/// Environment variable enabling debug logging of rendered requests
pub const ENV_DEBUG: &str = "EPR_DEBUG";

/// Where and how to reach the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Registry base URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Path of the GraphQL endpoint, relative to `url`
    #[serde(default = "default_graphql_path")]
    pub graphql_path: String,

    /// Timeout applied when the call context sets none
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Log rendered requests at debug level
    #[serde(default)]
    pub debug: bool,
}

fn default_url() -> String { "http://localhost:8042".to_string() }
fn default_graphql_path() -> String { "/api/v1/graphql/query".to_string() }
fn default_timeout() -> u64 { 30000 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            graphql_path: default_graphql_path(),
            timeout_ms: default_timeout(),
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Create a builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a JSON configuration document; absent keys take their defaults
    pub fn from_json(json: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read `EPR_URL`, `EPR_TIMEOUT_MS` and `EPR_DEBUG` from the environment
    ///
    /// Unset variables keep their defaults; set but unparseable values are
    /// an error.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading through `lookup`
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL) {
            let url = url.trim();
            if url.is_empty() {
                return Err(ClientError::config(ENV_URL, url, "must not be empty"));
            }
            config.url = url.to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| ClientError::config(ENV_TIMEOUT_MS, &raw, "expected milliseconds"))?;
        }

        if let Some(raw) = lookup(ENV_DEBUG) {
            config.debug = parse_flag(&raw)
                .ok_or_else(|| ClientError::config(ENV_DEBUG, &raw, "expected true or false"))?;
        }

        Ok(config)
    }

    /// Full URL of the GraphQL endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.graphql_path.trim_start_matches('/')
        )
    }

    /// Default call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    url: Option<String>,
    graphql_path: Option<String>,
    timeout_ms: Option<u64>,
    debug: Option<bool>,
}

impl ClientConfigBuilder {
    /// Set the registry base URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the GraphQL endpoint path
    pub fn graphql_path(mut self, path: impl Into<String>) -> Self {
        self.graphql_path = Some(path.into());
        self
    }

    /// Set the default call timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            url: self.url.unwrap_or_else(default_url),
            graphql_path: self.graphql_path.unwrap_or_else(default_graphql_path),
            timeout_ms: self.timeout_ms.unwrap_or_else(default_timeout),
            debug: self.debug.unwrap_or(false),
        }
    }
}
