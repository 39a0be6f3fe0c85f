//! HTTP transport with retry logic
//!
//! The collector only needs "GET this URL with these query parameters and
//! give me the body". Everything connection-related, including retries and
//! certificate verification, lives behind the `Transport` trait.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use forge_core::error::ForgeError;
use crate::RegistryResult;

/// One successful HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// Final request URL, query included
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Raw body
    pub text: String,
}

impl RawResponse {
    /// Parse the body as JSON
    pub fn json(&self) -> RegistryResult<Value> {
        serde_json::from_str(&self.text)
            .map_err(|e| ForgeError::json(format!("invalid JSON from {}", self.url), e))
    }

    /// Turn a non-success status into a transport error
    pub fn error_for_status(self) -> RegistryResult<Self> {
        if (200..300).contains(&self.status) {
            Ok(self)
        } else {
            Err(ForgeError::status(self.url, self.status))
        }
    }
}

/// Issues GET requests against the registry
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `params` appended to its query string.
    ///
    /// Non-success statuses must surface as `ForgeError::Transport`.
    async fn get(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn get(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<RawResponse> {
        (**self).get(url, params).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<RawResponse> {
        (**self).get(url, params).await
    }
}

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Settings of the reqwest-backed transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Verify TLS certificates
    pub ssl_verify: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry policy for recoverable failures
    pub retry: RetryConfig,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ssl_verify: true,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            user_agent: concat!("forge-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Underlying HTTP client
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
}

impl HttpTransport {
    /// Create a transport with default settings
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom settings
    pub fn with_config(config: TransportConfig) -> RegistryResult<Self> {
        if !config.ssl_verify {
            warn!("TLS certificate verification is disabled");
        }

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .gzip(true)
            .user_agent(config.user_agent)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(|e| ForgeError::transport("", format!("Failed to create HTTP client: {}", e), e))?;

        Ok(Self {
            client,
            retry_config: config.retry,
        })
    }

    /// Retry configuration in use
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Execute a request with exponential backoff on recoverable failures
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) if attempt < self.retry_config.max_retries && error.is_recoverable() => {
                    attempt += 1;
                    warn!(
                        "Request failed ({}); retry {}/{} in {:?}",
                        error, attempt, self.retry_config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn send_once(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<RawResponse> {
        let mut request = self.client.get(url.clone());
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ForgeError::transport(url.as_str(), format!("request failed: {}", e), e))?;

        let final_url = response.url().to_string();
        let status = response.status();

        if !status.is_success() {
            return Err(ForgeError::status(final_url, status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ForgeError::transport(final_url.as_str(), format!("failed to read body: {}", e), e))?;

        Ok(RawResponse {
            url: final_url,
            status: status.as_u16(),
            text,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<RawResponse> {
        debug!("GET {} params: {:?}", url, params);
        self.with_retry(|| self.send_once(url, params)).await
    }
}
