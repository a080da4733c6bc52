//! SimpleDB client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://sdb.amazonaws.com/";

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for SimpleDB connections.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SimpleDbConfig {
    /// Access key identifier used to sign requests
    #[cfg_attr(
        feature = "config",
        arg(long = "simpledb-access-key", env = "SIMPLEDB_ACCESS_KEY", default_value = "")
    )]
    #[serde(default)]
    pub access_key: String,

    /// Secret key used to sign requests
    #[cfg_attr(
        feature = "config",
        arg(long = "simpledb-secret-key", env = "SIMPLEDB_SECRET_KEY", default_value = "")
    )]
    #[serde(default)]
    pub secret_key: String,

    /// Service endpoint URL
    #[cfg_attr(
        feature = "config",
        arg(long = "simpledb-endpoint", env = "SIMPLEDB_ENDPOINT")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "simpledb-timeout", env = "SIMPLEDB_TIMEOUT_SECS")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Ask for consistent reads on get and select
    #[cfg_attr(
        feature = "config",
        arg(long = "simpledb-consistent-read", env = "SIMPLEDB_CONSISTENT_READ")
    )]
    #[serde(default)]
    pub consistent_read: bool,
}

impl SimpleDbConfig {
    /// Creates a new configuration with the given credentials.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint: None,
            timeout_secs: None,
            consistent_read: false,
        }
    }

    /// Set the service endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Enable consistent reads.
    #[must_use]
    pub fn with_consistent_read(mut self) -> Self {
        self.consistent_read = true;
        self
    }

    /// Returns the request timeout, falling back to the default.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Returns the parsed endpoint URL.
    pub fn endpoint_url(&self) -> Result<Url> {
        let raw = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let url = Url::parse(raw)
            .map_err(|e| Error::invalid_config(format!("invalid endpoint '{raw}': {e}")))?;

        if url.host_str().is_none() {
            return Err(Error::invalid_config(format!(
                "endpoint '{raw}' has no host"
            )));
        }

        Ok(url)
    }

    /// Checks that both credentials are present and the endpoint parses.
    pub fn validate(&self) -> Result<()> {
        if self.access_key.trim().is_empty() {
            return Err(Error::invalid_config("access key is required"));
        }

        if self.secret_key.trim().is_empty() {
            return Err(Error::invalid_config("secret key is required"));
        }

        self.endpoint_url().map(|_| ())
    }
}

impl std::fmt::Debug for SimpleDbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleDbConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("consistent_read", &self.consistent_read)
            .finish()
    }
}
