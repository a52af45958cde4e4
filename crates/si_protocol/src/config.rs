//! Client configuration passed explicitly into the HTTP transport.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::defaults::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API token is empty")]
    EmptyToken,
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Everything the client needs to reach the API.
///
/// The bearer token lives here and nowhere else; `Debug` output redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    token: String,
    timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration, validating the URL and trimming the token.
    pub fn new(base_url: &str, token: &str) -> Result<Self, ConfigError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            token: token.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Configuration against the public endpoint.
    pub fn with_default_url(token: &str) -> Result<Self, ConfigError> {
        Self::new(DEFAULT_BASE_URL, token)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Absolute URL for an API path such as `/whoami`.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Show only the last four characters of a secret.
pub fn redact(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{}", tail)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
