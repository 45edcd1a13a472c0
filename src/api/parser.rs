//! Dispatcher response parser
//!
//! Stateless functions converting raw response bodies into typed values.
//! Data pages arrive in the paginated envelope
//! `{"total": n, "limit": n, "skip": n, "data": [row, ...]}`, each row
//! mapping onto a [`Record`].

use serde_json::Value;

use crate::api::{ApiError, ApiResult};
use crate::retrieval::progress::Progress;
use crate::Record;

/// One parsed page: the server's pagination metadata and its records.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    /// Pagination metadata as reported by the server
    pub progress: Progress,
    /// Records in server order
    pub records: Vec<Record>,
}

impl QueryResponse {
    /// Whether the server-reported window already covers the total.
    pub fn is_complete(&self) -> bool {
        self.progress.advance(self.records.len()).is_complete()
    }
}

/// Stateless parser for dispatcher API responses
pub struct ResponseParser;

impl ResponseParser {
    /// Extract `accessToken` from an authentication response body.
    ///
    /// Returns `None` if the body is not JSON or the field is missing/empty.
    pub fn parse_access_token(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        value
            .get("accessToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// Parse a data page.
    ///
    /// # Errors
    /// Returns [`ApiError::Parse`] if the body is not JSON, `total` or `data`
    /// is missing, or any row fails to map onto a [`Record`].
    pub fn parse_data_page(body: &str) -> ApiResult<QueryResponse> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ApiError::Parse(format!("Response is not valid JSON: {e}")))?;

        let total = value
            .get("total")
            .and_then(Value::as_u64)
            .ok_or_else(|| ApiError::Parse("Missing or invalid total".to_string()))?;

        let limit = value
            .get("limit")
            .and_then(Value::as_u64)
            .map(|limit| u32::try_from(limit).unwrap_or(u32::MAX))
            .unwrap_or(0);

        let skip = value.get("skip").and_then(Value::as_u64).unwrap_or(0);

        let rows = value
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::Parse("Missing or invalid data array".to_string()))?;

        let records = Self::parse_records(rows)?;

        Ok(QueryResponse {
            progress: Progress::new(total, limit, skip),
            records,
        })
    }

    /// Parse data rows into records, preserving order.
    pub fn parse_records(rows: &[Value]) -> ApiResult<Vec<Record>> {
        let mut records = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let record = Record::deserialize_row(row)
                .map_err(|e| ApiError::Parse(format!("Invalid row {index}: {e}")))?;
            records.push(record);
        }

        Ok(records)
    }
}
