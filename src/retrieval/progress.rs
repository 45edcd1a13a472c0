//! Progress tracking for paginated retrievals.
//!
//! A [`Progress`] is a snapshot: the engine builds a new one after every page
//! rather than mutating shared state. `skip` is the cumulative number of
//! records actually received, so a short page never advances the cursor past
//! data that was not returned.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query::PageOptions;

/// Pagination progress against a server-reported total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progress {
    /// Total records matching the query.
    pub total: u64,
    /// Page size.
    pub limit: u32,
    /// Records retrieved so far.
    pub skip: u64,
}

impl Progress {
    /// Create a progress snapshot.
    pub fn new(total: u64, limit: u32, skip: u64) -> Self {
        Self { total, limit, skip }
    }

    /// Whether every record has been retrieved. An empty result set is
    /// complete immediately.
    pub fn is_complete(&self) -> bool {
        self.skip >= self.total
    }

    /// Completion percentage, floored and capped at 100.
    pub fn percent_complete(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let percent = u128::from(self.skip) * 100 / u128::from(self.total);
        percent.min(100) as u8
    }

    /// Snapshot after a page returned `returned` records.
    pub fn advance(&self, returned: usize) -> Self {
        Self {
            skip: self.skip.saturating_add(returned as u64),
            ..*self
        }
    }

    /// Pagination window for the next page.
    pub fn next_page(&self, options: PageOptions) -> PageOptions {
        options.with_skip(self.skip)
    }

    /// Serializable status summary.
    pub fn status(&self) -> ProgressStatus {
        ProgressStatus {
            total_samples: self.total,
            retrieved_samples: self.skip,
            progress: self.to_string(),
            is_complete: self.is_complete(),
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent_complete())
    }
}

/// Status report for display or structured logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStatus {
    /// Total records matching the query
    pub total_samples: u64,
    /// Records retrieved so far
    pub retrieved_samples: u64,
    /// Percentage string, e.g. `"40%"`
    pub progress: String,
    /// Whether retrieval is finished
    pub is_complete: bool,
}
