//! Configuration for the HTTP remote client.

use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable holding the remote authority's base URL.
pub const API_URL_ENV: &str = "TASKSYNC_API_URL";

/// Environment variable holding the transport timeout in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "TASKSYNC_REQUEST_TIMEOUT_SECS";

/// Errors returned while building a [`RemoteClientConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL does not parse.
    #[error("invalid API URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// Rejected value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// The base URL uses a scheme other than `http` or `https`.
    #[error("unsupported API URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    /// The timeout is not a whole number of seconds.
    #[error("invalid request timeout '{0}', expected whole seconds")]
    InvalidTimeout(String),
}

/// Settings for reaching the remote authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteClientConfig {
    base_url: String,
    request_timeout: Option<Duration>,
}

impl RemoteClientConfig {
    /// Creates a configuration for `base_url` without a transport timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL does not parse or is not
    /// `http`/`https`.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        let parsed = Url::parse(trimmed).map_err(|err| ConfigError::InvalidBaseUrl {
            value: base_url.to_owned(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_owned()));
        }
        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_owned(),
            request_timeout: None,
        })
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset or blank variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let configured = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = match configured(API_URL_ENV) {
            Some(url) => Self::new(&url)?,
            None => Self::default(),
        };
        if let Some(raw) = configured(REQUEST_TIMEOUT_ENV) {
            let seconds = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.request_timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        }
        Ok(config)
    }

    /// Sets the transport timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the transport timeout, if any.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

impl Default for RemoteClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            request_timeout: None,
        }
    }
}
