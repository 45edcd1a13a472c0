//! Remote API plumbing
//!
//! - [`config`] - endpoint layout (`https://{project}.{host}/api/...`)
//! - [`http`] - reqwest-backed [`Transport`]
//! - [`parser`] - stateless response parsing into typed values
//!
//! The [`Transport`] trait is the only network seam in the crate. The session
//! manager and retrieval engine talk to it exclusively, which keeps status
//! handling and parsing testable against an in-memory implementation.

use async_trait::async_trait;

pub mod config;
pub mod http;
pub mod parser;

pub use config::ApiConfig;
pub use http::HttpTransport;
pub use parser::{QueryResponse, ResponseParser};

/// Transport and payload errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or timeout failure
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected HTTP status
    #[error("HTTP error {status}: {message}")]
    Http {
        /// Status code
        status: u16,
        /// Short description or body excerpt
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Client could not be constructed
    #[error("client error: {0}")]
    Client(String),
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Raw reply: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl ApiReply {
    /// Create a reply.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 401, the server's signal that the access token is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// 429 or 5xx.
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }

    /// Body truncated for error messages.
    pub fn body_excerpt(&self) -> String {
        const MAX_EXCERPT: usize = 200;
        let trimmed = self.body.trim();
        match trimmed.char_indices().nth(MAX_EXCERPT) {
            Some((cut, _)) => format!("{}...", &trimmed[..cut]),
            None => trimmed.to_string(),
        }
    }

    /// Convert a non-success reply into an [`ApiError::Http`].
    pub fn into_error(self) -> ApiError {
        let message = self.body_excerpt();
        ApiError::Http {
            status: self.status,
            message,
        }
    }
}

/// Network seam used by the session manager and the retrieval engine.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> ApiResult<ApiReply>;

    /// GET with an `Authorization` header value.
    async fn get(&self, url: &str, authorization: &str) -> ApiResult<ApiReply>;
}
