//! Retrieval metrics
//!
//! Recording goes through the `metrics` facade and is free until a recorder
//! is installed. [`init_metrics`] installs a Prometheus exporter serving
//! `/metrics` on the given address.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Metric names
pub mod names {
    /// Requests sent to the API, labelled by endpoint and status
    pub const API_REQUESTS: &str = "acelerate_api_requests_total";
    /// API request latency, labelled by endpoint
    pub const API_REQUEST_DURATION: &str = "acelerate_api_request_duration_seconds";
    /// Data pages received
    pub const PAGES_FETCHED: &str = "acelerate_pages_fetched_total";
    /// Records received across all pages
    pub const RECORDS_RETRIEVED: &str = "acelerate_records_retrieved_total";
    /// Re-authorizations triggered by token expiry
    pub const REAUTHORIZATIONS: &str = "acelerate_reauthorizations_total";
    /// Retrievals that returned a complete dataset
    pub const RETRIEVALS_COMPLETED: &str = "acelerate_retrievals_completed_total";
    /// Retrievals that failed, labelled by reason
    pub const RETRIEVALS_FAILED: &str = "acelerate_retrievals_failed_total";
    /// Wall-clock time of a complete retrieval
    pub const RETRIEVAL_DURATION: &str = "acelerate_retrieval_duration_seconds";
}

/// Metrics setup errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Exporter could not be installed (address in use, recorder already set)
    #[error("failed to install Prometheus exporter: {0}")]
    Install(#[from] BuildError),
}

/// Install the Prometheus exporter and register metric descriptions.
///
/// Idempotent: later calls are no-ops once an exporter is installed. Must be
/// called from within a Tokio runtime.
pub async fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    if METRICS_INITIALIZED.load(Ordering::SeqCst) {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics exporter on {}", addr);
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    METRICS_INITIALIZED.store(true, Ordering::SeqCst);
    describe_metrics();

    Ok(())
}

/// Register descriptions with whatever recorder is installed.
pub fn describe_metrics() {
    describe_counter!(names::API_REQUESTS, Unit::Count, "Requests sent to the dispatcher API");
    describe_histogram!(
        names::API_REQUEST_DURATION,
        Unit::Seconds,
        "Dispatcher API request latency"
    );
    describe_counter!(names::PAGES_FETCHED, Unit::Count, "Data pages received");
    describe_counter!(names::RECORDS_RETRIEVED, Unit::Count, "Telemetry records received");
    describe_counter!(
        names::REAUTHORIZATIONS,
        Unit::Count,
        "Re-authorizations after token expiry"
    );
    describe_counter!(
        names::RETRIEVALS_COMPLETED,
        Unit::Count,
        "Retrievals returning a complete dataset"
    );
    describe_counter!(names::RETRIEVALS_FAILED, Unit::Count, "Failed retrievals");
    describe_histogram!(
        names::RETRIEVAL_DURATION,
        Unit::Seconds,
        "Duration of complete retrievals"
    );
}

/// Whether [`init_metrics`] has installed an exporter.
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.load(Ordering::SeqCst)
}

/// Record one API round trip.
pub fn record_api_request(endpoint: &'static str, status: u16, duration: Duration) {
    counter!(names::API_REQUESTS, "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
    histogram!(names::API_REQUEST_DURATION, "endpoint" => endpoint)
        .record(duration.as_secs_f64());
}

/// Record a received data page.
pub fn record_page(records: usize) {
    counter!(names::PAGES_FETCHED).increment(1);
    counter!(names::RECORDS_RETRIEVED).increment(records as u64);
}

/// Record a token-expiry re-authorization.
pub fn record_reauthorization() {
    counter!(names::REAUTHORIZATIONS).increment(1);
}

/// Record a completed retrieval.
pub fn record_retrieval_completed(duration: Duration) {
    counter!(names::RETRIEVALS_COMPLETED).increment(1);
    histogram!(names::RETRIEVAL_DURATION).record(duration.as_secs_f64());
}

/// Record a failed retrieval.
pub fn record_retrieval_failed(reason: &'static str) {
    counter!(names::RETRIEVALS_FAILED, "reason" => reason).increment(1);
}
