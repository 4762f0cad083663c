//! Client configuration

use std::time::Duration;
use thiserror::Error;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the policy service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Network API endpoint, e.g. `http://controller:9696`
    pub endpoint: String,
    /// Keystone token sent as `X-Auth-Token`
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config for an endpoint with no token and the default timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the auth token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors building a client
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Endpoint is not an absolute http(s) URL
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as given
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP stack could not be initialised
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}
