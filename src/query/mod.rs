//! Query model
//!
//! Immutable value types describing *what* to fetch: a [`TimeRange`], a
//! [`Selector`] naming the telemetry stream, and the [`PageOptions`] window.
//! A [`Query`] composes the three and renders the canonical query string the
//! data endpoint expects:
//!
//! ```text
//! timestamp[$gt]=..&timestamp[$lt]=..&device_id=..&field_address=..&$limit=..&$skip=..&$sort[timestamp]=..
//! ```
//!
//! Keys always appear in that order and values are not percent-encoded.

pub mod options;
pub mod range;
pub mod timestamp;

pub use options::{PageOptions, Selector, SortDirection, DEFAULT_PAGE_LIMIT};
pub use range::TimeRange;
pub use timestamp::{Timestamp, TimestampInput};

use std::fmt;

/// Query construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Date/time text could not be parsed
    #[error("malformed timestamp: {input:?}")]
    MalformedTimestamp {
        /// The rejected input
        input: String,
    },

    /// Range start is after range end
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidRange {
        /// Rendered start bound
        start: String,
        /// Rendered end bound
        end: String,
    },

    /// Page size of zero
    #[error("invalid page size: limit must be positive")]
    InvalidPageSize,
}

/// Result type for query construction
pub type QueryResult<T> = Result<T, QueryError>;

const KEY_TIME_START: &str = "timestamp[$gt]";
const KEY_TIME_END: &str = "timestamp[$lt]";
const KEY_DEVICE_ID: &str = "device_id";
const KEY_FIELD_ADDRESS: &str = "field_address";
const KEY_LIMIT: &str = "$limit";
const KEY_SKIP: &str = "$skip";
const KEY_SORT: &str = "$sort[timestamp]";

/// One page request: range + selector + pagination window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    range: TimeRange,
    selector: Selector,
    options: PageOptions,
}

impl Query {
    /// Compose a query.
    pub fn new(range: TimeRange, selector: Selector, options: PageOptions) -> Self {
        Self {
            range,
            selector,
            options,
        }
    }

    /// The same range and selector with a new pagination window.
    pub fn with_options(&self, options: PageOptions) -> Self {
        Self {
            range: self.range.clone(),
            selector: self.selector,
            options,
        }
    }

    /// Time range.
    pub fn range(&self) -> &TimeRange {
        &self.range
    }

    /// Stream selector.
    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// Pagination window.
    pub fn options(&self) -> PageOptions {
        self.options
    }

    /// Ordered key/value parameters.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let (start, end) = self.range.query_string_tuple();
        vec![
            (KEY_TIME_START, start),
            (KEY_TIME_END, end),
            (KEY_DEVICE_ID, self.selector.device_id.to_string()),
            (KEY_FIELD_ADDRESS, self.selector.field_address.to_string()),
            (KEY_LIMIT, self.options.limit().to_string()),
            (KEY_SKIP, self.options.skip().to_string()),
            (KEY_SORT, self.options.sort().to_string()),
        ]
    }

    /// Canonical `key=value&...` encoding.
    pub fn to_query_string(&self) -> String {
        self.params()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}
