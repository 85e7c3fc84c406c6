//! Synchronous PEPd client.
//!
//! Each call marshals the request, POSTs the bytes to the configured
//! endpoint URLs in order, and unmarshals the first successful HTTP
//! response body. Transport failures move on to the next endpoint; codec
//! failures are non-retriable and surface immediately. The client holds
//! no per-request state, so one instance can serve concurrent calls.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::hessian::EncodeError;
use crate::marshal::{marshal_request, unmarshal_response, UnmarshalError};
use crate::xacml::{Request, Response};

/// Default connection timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a [`PepClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// PEPd endpoint URLs, tried in order until one answers.
    pub endpoints: Vec<String>,
    /// Connection and request timeout.
    pub timeout: Duration,
    /// Whether to validate the server TLS certificate.
    pub validate_ssl: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            validate_ssl: true,
        }
    }
}

impl ClientConfig {
    /// Appends a failover endpoint URL.
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoints.push(url.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables TLS certificate validation.
    #[must_use]
    pub const fn validate_ssl(mut self, validate: bool) -> Self {
        self.validate_ssl = validate;
        self
    }
}

/// Error type for client operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The configuration cannot produce a working client.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The request graph could not be marshalled.
    #[error("failed to marshal request: {0}")]
    Marshal(#[from] EncodeError),

    /// The response body could not be unmarshalled.
    #[error("failed to unmarshal response: {0}")]
    Unmarshal(#[from] UnmarshalError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// Every configured endpoint failed.
    #[error("all {tried} PEPd endpoint(s) failed")]
    AllEndpointsFailed {
        /// How many endpoints were tried.
        tried: usize,
    },
}

/// Client for a XACML Policy Enforcement Point daemon.
#[derive(Debug)]
pub struct PepClient {
    config: ClientConfig,
    http: reqwest::blocking::Client,
}

impl PepClient {
    /// Builds a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when no endpoint is
    /// configured, or [`ClientError::Http`] when the HTTP client cannot
    /// be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.endpoints.is_empty() {
            return Err(ClientError::InvalidConfig(
                "at least one PEPd endpoint URL is required".to_owned(),
            ));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.validate_ssl)
            .build()?;
        Ok(Self { config, http })
    }

    /// The configured endpoint URLs, in failover order.
    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.config.endpoints
    }

    /// Submits an authorization request and returns the PEPd's response.
    ///
    /// # Errors
    ///
    /// Codec errors surface immediately; transport errors are retried on
    /// the next endpoint and collapse into
    /// [`ClientError::AllEndpointsFailed`] once the list is exhausted.
    pub fn authorize(&self, request: &Request) -> Result<Response, ClientError> {
        let body = marshal_request(request)?;
        debug!(bytes = body.len(), "marshalled authorization request");

        for url in &self.config.endpoints {
            match self.post(url, body.as_ref()) {
                Ok(payload) => {
                    debug!(%url, bytes = payload.len(), "received PEPd response");
                    return Ok(unmarshal_response(&payload)?);
                },
                Err(err) => {
                    warn!(%url, error = %err, "PEPd endpoint failed, trying next");
                },
            }
        }
        Err(ClientError::AllEndpointsFailed {
            tried: self.config.endpoints.len(),
        })
    }

    fn post(&self, url: &str, body: &[u8]) -> Result<Vec<u8>, reqwest::Error> {
        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body.to_vec())
            .send()?
            .error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}
