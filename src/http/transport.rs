use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, warn};

use super::response::TransportResponse;
use crate::args::{
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF, DEFAULT_USER_AGENT,
    HttpMethod,
};
use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Sends one JSON request and always yields a response value.
///
/// Connection-level failures are retried inside the transport; once attempts
/// are exhausted the implementation returns [`TransportResponse::failed`]
/// instead of an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: HttpMethod, path: &str, body: &Value) -> TransportResponse;
}

/// Attempts and fixed backoff for connection-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request; values below 1 are treated as 1.
    pub max_attempts: u64,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Connection settings for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub host: String,
    pub headers: Vec<(String, String)>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl TransportConfig {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            headers: Vec::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// `reqwest`-backed transport. One client (and connection pool) per instance.
pub struct ReqwestTransport {
    client: Client,
    host: String,
    retry: RetryPolicy,
    request_seq: AtomicU64,
}

impl ReqwestTransport {
    /// Builds the client and validates the host.
    ///
    /// # Errors
    ///
    /// Returns an error when the host is empty or not a valid URL, a header is
    /// malformed, or the HTTP client cannot be built.
    pub fn new(config: &TransportConfig) -> AppResult<Self> {
        let host = config.host.trim();
        if host.is_empty() {
            return Err(AppError::validation(ValidationError::HostEmpty));
        }
        Url::parse(host).map_err(|err| {
            AppError::http(HttpError::InvalidUrl {
                url: host.to_owned(),
                source: err,
            })
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(build_headers(&config.headers)?)
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;

        Ok(Self {
            client,
            host: host.to_owned(),
            retry: config.retry,
            request_seq: AtomicU64::new(0),
        })
    }

    /// Joins `path` onto the host the same way every request does.
    ///
    /// # Errors
    ///
    /// Returns `JoinPathFailed` when the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, HttpError> {
        join_url(&self.host, path)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, method: HttpMethod, path: &str, body: &Value) -> TransportResponse {
        let request_id = self.request_seq.fetch_add(1, Ordering::Relaxed);
        let url = match self.endpoint(path) {
            Ok(url) => url,
            Err(err) => {
                error!(request_id, "{}", err);
                return TransportResponse::failed(err.to_string(), Duration::ZERO, 0);
            }
        };

        debug!(request_id, method = %method, url = %url, json = %body, "request");

        let max_attempts = self.retry.max_attempts.max(1);
        let run_started = Instant::now();
        let mut attempt: u64 = 0;
        let mut last_error = String::new();
        while attempt < max_attempts {
            attempt = attempt.saturating_add(1);
            let started = Instant::now();
            let outcome = self
                .client
                .request(method.to_reqwest(), url.clone())
                .json(body)
                .send()
                .await;
            let result = match outcome {
                Ok(response) => {
                    let status = response.status().as_u16();
                    response.text().await.map(|text| (status, text))
                }
                Err(err) => Err(err),
            };

            match result {
                Ok((status, text)) => {
                    let response =
                        TransportResponse::completed(status, text, started.elapsed(), attempt);
                    log_response(request_id, method, &url, body, &response);
                    return response;
                }
                Err(err) => {
                    warn!(
                        request_id,
                        attempt,
                        max_attempts,
                        "Request to {} failed: {}",
                        url,
                        err
                    );
                    last_error = err.to_string();
                }
            }

            if attempt < max_attempts {
                sleep(self.retry.backoff).await;
            }
        }

        error!(
            request_id,
            attempts = attempt,
            "Giving up on {} {}: {}",
            method,
            url,
            last_error
        );
        TransportResponse::failed(last_error, run_started.elapsed(), attempt)
    }
}

fn log_response(
    request_id: u64,
    method: HttpMethod,
    url: &Url,
    body: &Value,
    response: &TransportResponse,
) {
    let elapsed_ms = response.elapsed().as_millis();
    let status = response.status().unwrap_or_default();
    if !response.is_ok() {
        error!(request_id, method = %method, url = %url, json = %body, status, "request");
        error!(request_id, "{}", response.body());
    }
    debug!(
        request_id,
        url = %url,
        status,
        elapsed_ms,
        text = response.body(),
        "response"
    );
}

pub(crate) fn join_url(host: &str, path: &str) -> Result<Url, HttpError> {
    let base = host.trim_end_matches('/');
    let joined = if path.is_empty() {
        format!("{}/", base)
    } else if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    };
    Url::parse(&joined).map_err(|err| HttpError::JoinPathFailed {
        host: host.to_owned(),
        path: path.to_owned(),
        source: err,
    })
}

fn build_headers(headers: &[(String, String)]) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderName {
                header: key.clone(),
                source: err,
            })
        })?;
        let val = HeaderValue::from_str(value).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderValue {
                header: key.clone(),
                source: err,
            })
        })?;
        map.append(name, val);
    }
    Ok(map)
}
