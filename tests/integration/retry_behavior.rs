//! Transport retries with backoff

use acelerate_client::api::ApiReply;
use acelerate_client::retrieval::{EngineConfig, FailureReason};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::support::{self, network_error, window, MockApi};

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let failures = Arc::new(AtomicUsize::new(0));
    let counter = failures.clone();
    let api = Arc::new(MockApi::new(Box::new(move |req| {
        if req.skip == 10_000 && counter.fetch_add(1, Ordering::SeqCst) < 2 {
            return Ok(ApiReply::new(503, "Service Unavailable"));
        }
        Ok(window(25_000, req))
    })));
    let engine =
        support::engine(&api).with_config(EngineConfig::default().with_transport_retries(2));

    let records = engine
        .retrieve(&support::range(), support::selector(), 10_000)
        .await
        .unwrap();

    assert_eq!(records.len(), 25_000);
    assert_eq!(api.skips(), vec![0, 10_000, 10_000, 10_000, 20_000]);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_fail() {
    let api = Arc::new(MockApi::new(Box::new(|_| Err(network_error()))));
    let engine =
        support::engine(&api).with_config(EngineConfig::default().with_transport_retries(3));

    let err = engine
        .retrieve(&support::range(), support::selector(), 10_000)
        .await
        .unwrap_err();

    assert!(matches!(err.reason(), Some(FailureReason::Transport(_))));
    assert_eq!(api.requests().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_client_errors_are_not_retried() {
    let api = Arc::new(MockApi::new(Box::new(|_| {
        Ok(ApiReply::new(400, r#"{"message":"Bad query"}"#))
    })));
    let engine =
        support::engine(&api).with_config(EngineConfig::default().with_transport_retries(3));

    let err = engine
        .retrieve(&support::range(), support::selector(), 10_000)
        .await
        .unwrap_err();

    assert!(matches!(err.reason(), Some(FailureReason::Transport(_))));
    assert_eq!(api.requests().len(), 1);
}
