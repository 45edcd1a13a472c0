//! Time range bounding a telemetry query.

use std::fmt;

use crate::query::timestamp::{Timestamp, TimestampInput};
use crate::query::{QueryError, QueryResult};

/// Inclusive-looking, server-interpreted window `(start, end)`.
///
/// The server applies strictly-greater / strictly-less comparisons to the
/// bounds; this type only guarantees `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TimeRange {
    /// Build a range from resolved timestamps or date/time text.
    ///
    /// # Errors
    /// - [`QueryError::MalformedTimestamp`] if either bound fails to parse
    /// - [`QueryError::InvalidRange`] if `start` is after `end`
    pub fn new(
        start: impl Into<TimestampInput>,
        end: impl Into<TimestampInput>,
    ) -> QueryResult<Self> {
        let start = start.into().resolve()?;
        let end = end.into().resolve()?;

        if start.instant() > end.instant() {
            return Err(QueryError::InvalidRange {
                start: start.to_iso_string(),
                end: end.to_iso_string(),
            });
        }

        Ok(Self { start, end })
    }

    /// Lower bound.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Upper bound.
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Both bounds in their query-string form.
    pub fn query_string_tuple(&self) -> (String, String) {
        (self.start.to_iso_string(), self.end.to_iso_string())
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
