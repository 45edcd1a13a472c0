//! reqwest-backed transport
//!
//! Performs exactly one HTTP round trip per call. Status handling (expiry,
//! retry, parse) lives with the callers so that behavior is identical for
//! every [`Transport`] implementation.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::{ApiError, ApiReply, ApiResult, Transport};

/// HTTP connect timeout (seconds) - time to establish TCP connection
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// HTTP request timeout (seconds) - overall time for the entire request
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Transport over a shared reqwest [`Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with the default connect/request timeouts.
    ///
    /// # Errors
    /// Returns [`ApiError::Client`] if the TLS backend cannot be initialised.
    pub fn new() -> ApiResult<Self> {
        Self::with_timeouts(
            Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS),
            Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Build a transport with explicit timeouts.
    pub fn with_timeouts(connect_timeout: Duration, request_timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (connection pool shared with the caller).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn into_reply(response: reqwest::Response) -> ApiResult<ApiReply> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read response body: {e}")))?;
        Ok(ApiReply { status, body })
    }
}

/// Describe a reqwest failure without echoing request contents.
fn describe_error(error: &reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_request() {
        "request failed"
    } else {
        "network error"
    };
    match error.url() {
        Some(url) => format!("{kind}: {} ({})", url.host_str().unwrap_or("unknown host"), error),
        None => format!("{kind}: {error}"),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> ApiResult<ApiReply> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let message = describe_error(&e);
                warn!("POST failed: {}", message);
                ApiError::Network(message)
            })?;
        Self::into_reply(response).await
    }

    async fn get(&self, url: &str, authorization: &str) -> ApiResult<ApiReply> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| {
                let message = describe_error(&e);
                warn!("GET failed: {}", message);
                ApiError::Network(message)
            })?;
        Self::into_reply(response).await
    }
}
