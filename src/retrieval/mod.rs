//! Paginated retrieval
//!
//! The engine drives the request/response loop for one selector:
//!
//! 1. Ensure the session is authorized
//! 2. Request the page at the current cursor
//! 3. Append the page's records, in server order
//! 4. Advance the cursor by the number of records actually returned
//! 5. Repeat until [`Progress::is_complete`]
//!
//! # Components
//!
//! - [`engine`] - [`RetrievalEngine`], the loop itself
//! - [`progress`] - [`Progress`] snapshots and completion arithmetic
//! - [`config`] - [`EngineConfig`] and backoff constants
//!
//! # Error Handling
//!
//! Failures before the first request (bad page size, authorization) surface
//! as [`RetrievalError::Query`] / [`RetrievalError::Session`]. Failures
//! during the loop surface as [`RetrievalError::Failed`] with a
//! [`FailureReason`] and the records accumulated up to that point, so the
//! caller can decide whether a partial dataset is useful.

pub mod config;
pub mod engine;
pub mod progress;

pub use config::EngineConfig;
pub use engine::RetrievalEngine;
pub use progress::{Progress, ProgressStatus};

use crate::query::{QueryError, Selector};
use crate::session::SessionError;
use crate::Record;

/// Why a started retrieval stopped early
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// The token was rejected, and re-authorizing or the single retry failed
    #[error("access token expired and the retry after re-authorization failed: {0}")]
    AuthExpiredRetryFailed(String),

    /// Network error, unexpected status, or malformed payload
    #[error("transport failure: {0}")]
    Transport(String),

    /// A page returned no records before the total was reached
    #[error("pagination stalled at {skip} of {total} records")]
    StalledPagination {
        /// Records retrieved when the empty page arrived
        skip: u64,
        /// Server-reported total
        total: u64,
    },

    /// Page cap reached
    #[error("page limit of {max_pages} exceeded")]
    PageLimitExceeded {
        /// Configured cap
        max_pages: usize,
    },

    /// Cancelled through a [`CancelSignal`](crate::cancel::CancelSignal)
    #[error("retrieval cancelled")]
    Cancelled,
}

impl FailureReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::AuthExpiredRetryFailed(_) => "auth_expired_retry_failed",
            FailureReason::Transport(_) => "transport",
            FailureReason::StalledPagination { .. } => "stalled_pagination",
            FailureReason::PageLimitExceeded { .. } => "page_limit_exceeded",
            FailureReason::Cancelled => "cancelled",
        }
    }
}

/// Retrieval errors
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Invalid query parameters
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Initial authorization failed
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The page loop stopped early
    #[error("retrieval of {selector} failed after {} records: {reason}", .partial.len())]
    Failed {
        /// Stream being retrieved
        selector: Selector,
        /// Cause
        reason: FailureReason,
        /// Records accumulated before the failure, in server order
        partial: Vec<Record>,
    },
}

impl RetrievalError {
    /// Failure reason, for errors raised inside the page loop.
    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            RetrievalError::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Records retrieved before the failure.
    pub fn partial_records(&self) -> &[Record] {
        match self {
            RetrievalError::Failed { partial, .. } => partial,
            _ => &[],
        }
    }

    /// Take ownership of the records retrieved before the failure.
    pub fn into_partial_records(self) -> Vec<Record> {
        match self {
            RetrievalError::Failed { partial, .. } => partial,
            _ => Vec::new(),
        }
    }
}
