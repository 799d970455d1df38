//! Endpoint fallback for IFSC lookups
//!
//! The resolver walks its endpoints in priority order. Each endpoint gets the
//! configured number of tries with exponential backoff in between; the first
//! 200 OK with a JSON object body wins. When every endpoint is exhausted the
//! lookup is unresolved (`None`), which is not an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::{Config, EndpointConfig, RetryConfig};
use crate::error::{Error, FetchError, Result};
use crate::retry::{Sleeper, TokioSleeper, retry_with_backoff};
use crate::types::{LookupCode, RawResult};

/// Performs a single try against a fully rendered endpoint URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch and decode one lookup response
    async fn fetch(&self, url: &str) -> std::result::Result<RawResult, FetchError>;
}

/// [`Fetcher`] that issues HTTP GET requests with a per-request timeout
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ifsc-ledger/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client, timeout })
    }

    /// Timeout applied to each request
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<RawResult, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::InvalidBody {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        RawResult::from_json(&value).ok_or_else(|| FetchError::InvalidBody {
            url: url.to_string(),
            reason: "expected a JSON object".to_string(),
        })
    }
}

/// Resolves lookup codes against a prioritized list of endpoints
pub struct Resolver {
    endpoints: Vec<EndpointConfig>,
    retry: RetryConfig,
    fetcher: Arc<dyn Fetcher>,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("endpoints", &self.endpoints)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Assemble a resolver from explicit parts
    pub fn new(
        endpoints: Vec<EndpointConfig>,
        retry: RetryConfig,
        fetcher: Arc<dyn Fetcher>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            endpoints,
            retry,
            fetcher,
            sleeper,
        }
    }

    /// Build the production resolver: HTTP fetcher, Tokio timer
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.request_timeout)?;
        Ok(Self::new(
            config.endpoints.clone(),
            config.retry.clone(),
            Arc::new(fetcher),
            Arc::new(TokioSleeper),
        ))
    }

    /// Endpoints in the order they are tried
    pub fn endpoints(&self) -> &[EndpointConfig] {
        &self.endpoints
    }

    /// Look up `code`, returning the first successful payload
    ///
    /// Never fails: transport errors, timeouts and non-200 answers are retried
    /// and then fall through to the next endpoint. `None` means no endpoint
    /// produced a usable answer.
    pub async fn resolve(&self, code: &LookupCode) -> Option<RawResult> {
        let encoded = urlencoding::encode(code.as_str());

        for endpoint in &self.endpoints {
            let url = endpoint.render(&encoded);
            let fetcher = self.fetcher.as_ref();
            let target = url.as_str();
            let name = endpoint.name.as_str();

            let outcome =
                retry_with_backoff(&self.retry, self.sleeper.as_ref(), move |attempt| {
                    tracing::debug!(
                        endpoint = name,
                        url = target,
                        attempt = attempt + 1,
                        "Querying lookup endpoint"
                    );
                    fetcher.fetch(target)
                })
                .await;

            match outcome {
                Ok(raw) => {
                    tracing::info!(endpoint = name, code = %code, "Lookup resolved");
                    return Some(raw);
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = name,
                        code = %code,
                        error = %e,
                        "Endpoint exhausted, falling back"
                    );
                }
            }
        }

        tracing::warn!(
            code = %code,
            endpoints = self.endpoints.len(),
            "Lookup unresolved on every endpoint"
        );
        None
    }
}
