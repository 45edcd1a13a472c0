//! Timestamp normalization for query bounds and response rows.
//!
//! Callers may hand the query model either an already-resolved date/time or a
//! human-readable string. Both are normalized into [`Timestamp`] exactly once,
//! at construction time; nothing downstream ever sees the raw input again.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::query::{QueryError, QueryResult};

/// Formats carrying an explicit UTC offset, tried in order.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Wall-clock formats without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

/// Date-only formats, resolved to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%b %d %Y", "%b %d, %Y", "%d %b %Y"];

const NANOS_PER_SECOND: u32 = 1_000_000_000;

fn truncate_to_micros(local: NaiveDateTime) -> NaiveDateTime {
    let nanos = local.nanosecond();
    local.with_nanosecond(nanos - nanos % 1_000).unwrap_or(local)
}

/// A normalized point in time.
///
/// Naive inputs stay naive and offset-aware inputs keep their offset, so the
/// rendered ISO-8601 form matches what the caller supplied
/// (`2021-08-14T09:12:00` vs `2021-08-14T09:12:00+02:00`).
///
/// Precision is one microsecond: finer digits are truncated on construction,
/// so parsing the ISO rendering yields an equal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl Timestamp {
    /// Wrap a wall-clock date/time without an offset.
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            local: truncate_to_micros(local),
            offset: None,
        }
    }

    /// Wrap an offset-aware date/time, keeping its offset.
    pub fn aware<Tz: TimeZone>(datetime: DateTime<Tz>) -> Self {
        Self {
            local: truncate_to_micros(datetime.naive_local()),
            offset: Some(datetime.offset().fix()),
        }
    }

    /// Parse a human-readable date/time string.
    ///
    /// Accepts RFC 3339, `T` or space separators, optional seconds and
    /// fractional seconds, `Z`/`+HH:MM`/`+HHMM` offsets, date-only values and
    /// a handful of month-name layouts.
    ///
    /// # Errors
    /// Returns [`QueryError::MalformedTimestamp`] if no layout matches.
    pub fn parse(input: &str) -> QueryResult<Self> {
        let trimmed = input.trim();
        let malformed = || QueryError::MalformedTimestamp {
            input: input.to_string(),
        };

        if trimmed.is_empty() {
            return Err(malformed());
        }

        if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::aware(datetime));
        }

        // Zulu suffix on a layout RFC 3339 rejects (space separator, no seconds)
        let normalized = match trimmed.strip_suffix(|c: char| c == 'Z' || c == 'z') {
            Some(head) => format!("{head}+00:00"),
            None => trimmed.to_string(),
        };

        for format in OFFSET_FORMATS {
            if let Ok(datetime) = DateTime::parse_from_str(&normalized, format) {
                return Ok(Self::aware(datetime));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self::naive(local));
            }
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                if let Some(local) = date.and_hms_opt(0, 0, 0) {
                    return Ok(Self::naive(local));
                }
            }
        }

        Err(malformed())
    }

    /// Wall-clock date/time as supplied.
    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    /// UTC offset, if the input carried one.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// The absolute instant. Naive timestamps are interpreted as UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        match self.offset {
            Some(offset) => {
                let shift = chrono::Duration::seconds(i64::from(offset.local_minus_utc()));
                Utc.from_utc_datetime(&(self.local - shift))
            }
            None => Utc.from_utc_datetime(&self.local),
        }
    }

    /// ISO-8601 rendering, used verbatim in query strings.
    ///
    /// Fractional seconds appear as six digits only when nonzero. A leap
    /// second renders as `:60`.
    pub fn to_iso_string(&self) -> String {
        let mut rendered = self.local.format("%Y-%m-%dT%H:%M:%S").to_string();
        // chrono encodes a leap second as nanoseconds past 1_000_000_000
        let micros = (self.local.nanosecond() % NANOS_PER_SECOND) / 1_000;
        if micros != 0 {
            rendered.push_str(&format!(".{micros:06}"));
        }
        if let Some(offset) = self.offset {
            rendered.push_str(&offset.to_string());
        }
        rendered
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Either an already-resolved timestamp or text still to be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampInput {
    /// No parsing required.
    Resolved(Timestamp),
    /// Parsed with [`Timestamp::parse`] on resolution.
    Text(String),
}

impl TimestampInput {
    /// Collapse the input into a [`Timestamp`].
    pub fn resolve(self) -> QueryResult<Timestamp> {
        match self {
            TimestampInput::Resolved(timestamp) => Ok(timestamp),
            TimestampInput::Text(text) => Timestamp::parse(&text),
        }
    }
}

impl From<Timestamp> for TimestampInput {
    fn from(timestamp: Timestamp) -> Self {
        TimestampInput::Resolved(timestamp)
    }
}

impl From<NaiveDateTime> for TimestampInput {
    fn from(local: NaiveDateTime) -> Self {
        TimestampInput::Resolved(Timestamp::naive(local))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimestampInput {
    fn from(datetime: DateTime<Tz>) -> Self {
        TimestampInput::Resolved(Timestamp::aware(datetime))
    }
}

impl From<&str> for TimestampInput {
    fn from(text: &str) -> Self {
        TimestampInput::Text(text.to_string())
    }
}

impl From<String> for TimestampInput {
    fn from(text: String) -> Self {
        TimestampInput::Text(text)
    }
}

impl From<&String> for TimestampInput {
    fn from(text: &String) -> Self {
        TimestampInput::Text(text.clone())
    }
}
