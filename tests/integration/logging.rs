//! Integration tests for logging and tracing

use acelerate_client::logging::{self, DEFAULT_LOG_FILTER};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::support::{self, MockApi};

#[test]
fn test_env_filter_parsing() {
    let _filter = EnvFilter::new(DEFAULT_LOG_FILTER);
    let _filter = EnvFilter::new("acelerate_client::retrieval=debug,acelerate_client::session=trace");
}

#[tokio::test]
async fn test_retrieval_logs_under_installed_subscriber() {
    logging::init_tracing();
    // A second installation attempt must be harmless
    logging::init_tracing();

    let api = Arc::new(MockApi::paged(3));
    let records = support::engine(&api)
        .retrieve(&support::range(), support::selector(), 2)
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
}
