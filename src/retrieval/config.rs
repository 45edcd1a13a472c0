//! Retrieval engine configuration constants

use std::time::Duration;

use crate::query::SortDirection;

/// Maximum pages fetched for one retrieval before giving up.
/// At the default page size this is 100 million records, far beyond any
/// realistic range; hitting it means the server is misreporting `total`.
pub const MAX_PAGES: usize = 10_000;

/// Automatic retries for transient transport failures. Zero by default:
/// a failed page surfaces to the caller unless retries are opted into.
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 0;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 30000; // 30 seconds

/// Calculate exponential backoff delay
pub fn calculate_backoff(retry_count: u32) -> Duration {
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(2u64.saturating_pow(retry_count));
    let delay_ms = delay_ms.min(MAX_BACKOFF_MS);
    Duration::from_millis(delay_ms)
}

/// Tuning knobs for [`RetrievalEngine`](crate::retrieval::RetrievalEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Retries for network errors, 429 and 5xx responses on a single page.
    pub max_transport_retries: u32,
    /// Page cap per retrieval.
    pub max_pages: usize,
    /// Server-side sort direction for every page.
    pub sort: SortDirection,
}

impl EngineConfig {
    /// Enable bounded retry with exponential backoff.
    pub fn with_transport_retries(mut self, retries: u32) -> Self {
        self.max_transport_retries = retries;
        self
    }

    /// Override the page cap.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Override the sort direction.
    pub fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_transport_retries: DEFAULT_TRANSPORT_RETRIES,
            max_pages: MAX_PAGES,
            sort: SortDirection::Ascending,
        }
    }
}
