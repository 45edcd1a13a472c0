//! # Acelerate Client
//!
//! An async client for the Acelerate dispatcher telemetry API. It
//! authenticates a project account, encodes time-windowed device/field
//! queries, and walks the paginated result set until every record in the
//! range has been retrieved.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use acelerate_client::api::{ApiConfig, HttpTransport};
//! use acelerate_client::query::{Selector, TimeRange};
//! use acelerate_client::retrieval::RetrievalEngine;
//! use acelerate_client::session::{Credentials, SessionManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new()?);
//! let credentials = Credentials::new("NICE", "ops@example.com", "secret");
//! let session = Arc::new(SessionManager::new(transport, ApiConfig::default(), credentials));
//! session.authorize().await?;
//!
//! let engine = RetrievalEngine::from_session(session);
//! let range = TimeRange::new("2021-08-14T09:12:00", "2021-08-15T00:12:00")?;
//! let records = engine.retrieve(&range, Selector::new(8355, 3219), 10_000).await?;
//! println!("retrieved {} records", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`query`] - time range, selector and pagination window; canonical query strings
//! - [`session`] - access token lifecycle and re-authorization on expiry
//! - [`retrieval`] - the pagination loop and progress tracking
//! - [`api`] - endpoint layout, the [`api::Transport`] seam and response parsing
//! - [`config`] - plain-value settings supplied by a configuration collaborator
//! - [`cancel`] - cooperative cancellation of in-flight retrievals
//! - [`logging`] - tracing subscriber setup
//! - [`metrics`] - request, page and retrieval metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatcher API plumbing
pub mod api;

/// Cancellation signal for retrievals
pub mod cancel;

/// Settings supplied by configuration collaborators
pub mod config;

/// Tracing subscriber initialisation
pub mod logging;

/// Retrieval metrics
pub mod metrics;

/// Query model
pub mod query;

/// Paginated retrieval
pub mod retrieval;

/// Authentication lifecycle
pub mod session;

// Re-export commonly used types
pub use query::{PageOptions, Query, Selector, SortDirection, TimeRange, Timestamp};
pub use retrieval::{FailureReason, Progress, RetrievalEngine, RetrievalError};
pub use session::{Credentials, SessionManager};

/// One telemetry sample as returned by the data endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Sample time
    pub timestamp: Timestamp,
    /// Device identifier
    pub device_id: u32,
    /// Human-readable field name
    pub field_name: String,
    /// Table the field belongs to
    pub field_table: String,
    /// Register/field address on the device
    pub field_address: u32,
    /// Sampled value; `null` when the device reported no reading
    #[serde(default)]
    pub value: Option<f64>,
    /// Engineering unit, if reported
    #[serde(default)]
    pub unit: Option<String>,
    /// Field tag, if reported
    #[serde(default)]
    pub field_tag: Option<String>,
}

impl Record {
    /// Map one response row onto a record.
    pub fn deserialize_row(row: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Record::deserialize(row)
    }

    /// The stream this record belongs to.
    pub fn selector(&self) -> Selector {
        Selector::new(self.device_id, self.field_address)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|{}|{}|{}|{}|{}|{}|{}|{}|",
            self.timestamp,
            self.device_id,
            self.field_name,
            self.field_table,
            self.field_address,
            self.value.map(|v| v.to_string()).unwrap_or_default(),
            self.unit.as_deref().unwrap_or(""),
            self.field_tag.as_deref().unwrap_or("")
        )
    }
}
