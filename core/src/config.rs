//! Per-client configuration.
//!
//! # Design
//! Every `ApiClient` owns its own `ClientConfig`. Nothing is shared between
//! instances by reference, so authenticating or adding headers on one
//! client can never leak into another.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_HOSTNAME: &str = "api.app.gigwalk.com";

/// Browsers cap connections per host at six; the queue defaults to the same.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 6;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme and host every request path is appended to.
    pub base_url: String,
    /// Maximum number of requests handed to the transport at once.
    pub concurrency_limit: usize,
    /// Transport timeout for a single round-trip, in milliseconds.
    pub timeout_ms: u64,
    /// Extra headers attached to every request.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_hostname(DEFAULT_HOSTNAME)
    }
}

impl ClientConfig {
    /// Defaults pointed at `https://{hostname}`.
    pub fn for_hostname(hostname: &str) -> Self {
        Self {
            base_url: format!("https://{hostname}"),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            headers: Vec::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::UnsupportedScheme(self.base_url.clone()));
        }
        if self.concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConfigError::InvalidHeader(format!("{name}: {e}")))?;
            HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}
