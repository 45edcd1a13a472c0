//! Stream selector and pagination window.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query::{QueryError, QueryResult};

/// Default number of records requested per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 10_000;

/// The (device, field) pair identifying a telemetry stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    /// Device identifier
    pub device_id: u32,
    /// Register/field address on the device
    pub field_address: u32,
}

impl Selector {
    /// Create a selector.
    pub fn new(device_id: u32, field_address: u32) -> Self {
        Self {
            device_id,
            field_address,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|DEVICE_ID: {}|FIELD_ADDRESS: {}|",
            self.device_id, self.field_address
        )
    }
}

/// Server-side ordering of records by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Oldest first (`1`)
    #[default]
    Ascending,
    /// Newest first (`-1`)
    Descending,
}

impl SortDirection {
    /// Wire value.
    pub fn as_i8(&self) -> i8 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Pagination window for one page request.
///
/// `limit` and `sort` are fixed for a logical query; only the `skip` cursor
/// moves, and it moves by producing a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageOptions {
    limit: u32,
    skip: u64,
    sort: SortDirection,
}

impl PageOptions {
    /// Window of `limit` records starting at the beginning of the range.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidPageSize`] when `limit` is zero.
    pub fn new(limit: u32) -> QueryResult<Self> {
        if limit == 0 {
            return Err(QueryError::InvalidPageSize);
        }
        Ok(Self {
            limit,
            skip: 0,
            sort: SortDirection::default(),
        })
    }

    /// Same window moved to `skip`.
    pub fn with_skip(self, skip: u64) -> Self {
        Self { skip, ..self }
    }

    /// Same window with a different sort direction.
    pub fn with_sort(self, sort: SortDirection) -> Self {
        Self { sort, ..self }
    }

    /// Maximum records per page.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Records already retrieved.
    pub fn skip(&self) -> u64 {
        self.skip
    }

    /// Sort direction.
    pub fn sort(&self) -> SortDirection {
        self.sort
    }
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            skip: 0,
            sort: SortDirection::Ascending,
        }
    }
}

impl fmt::Display for PageOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|LIMIT: {}|SKIP: {}|SORT: {}|",
            self.limit, self.skip, self.sort
        )
    }
}
