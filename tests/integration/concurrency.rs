//! Concurrent retrievals sharing one session

use acelerate_client::query::Selector;
use acelerate_client::retrieval::{FailureReason, RetrievalEngine};
use std::sync::Arc;
use std::time::Duration;

use crate::support::{self, unauthorized, window, MockApi, DEVICE_ID};

#[tokio::test]
async fn test_fields_are_returned_in_request_order() {
    let api = Arc::new(MockApi::paged(12_000));
    let engine = support::engine(&api);

    let outcomes = engine
        .retrieve_fields(&support::range(), DEVICE_ID, &[3219, 3220, 3221], 5_000)
        .await;

    let selectors: Vec<Selector> = outcomes.iter().map(|(s, _)| *s).collect();
    assert_eq!(
        selectors,
        vec![
            Selector::new(DEVICE_ID, 3219),
            Selector::new(DEVICE_ID, 3220),
            Selector::new(DEVICE_ID, 3221)
        ]
    );
    for (selector, outcome) in outcomes {
        let records = outcome.unwrap();
        assert_eq!(records.len(), 12_000);
        assert!(records.iter().all(|r| r.selector() == selector));
    }
    assert_eq!(api.auth_calls(), 1);
    assert_eq!(api.requests().len(), 9);
}

#[tokio::test(start_paused = true)]
async fn test_shared_expiry_triggers_one_reauthorization() {
    let api = Arc::new(
        MockApi::new(Box::new(|req| {
            if req.authorization == "Bearer token-1" {
                return Ok(unauthorized());
            }
            Ok(window(15_000, req))
        }))
        .with_latency(Duration::from_millis(50)),
    );
    let session = support::session(&api);
    session.authorize().await.unwrap();
    let engine = RetrievalEngine::from_session(session);

    let outcomes = engine
        .retrieve_fields(&support::range(), DEVICE_ID, &[3219, 3220], 10_000)
        .await;

    for (_, outcome) in outcomes {
        assert_eq!(outcome.unwrap().len(), 15_000);
    }
    assert_eq!(api.auth_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shared_expiry_with_failing_reauthorization_sends_one_request() {
    let api = Arc::new(
        MockApi::new(Box::new(|req| {
            if req.authorization == "Bearer token-1" {
                return Ok(unauthorized());
            }
            Ok(window(15_000, req))
        }))
        .with_latency(Duration::from_millis(50)),
    );
    let session = support::session(&api);
    session.authorize().await.unwrap();
    api.set_auth_status(401);
    let engine = RetrievalEngine::from_session(session);

    let outcomes = engine
        .retrieve_fields(
            &support::range(),
            DEVICE_ID,
            &[3219, 3220, 3221, 3222, 3223],
            10_000,
        )
        .await;

    assert_eq!(outcomes.len(), 5);
    for (_, outcome) in outcomes {
        let err = outcome.unwrap_err();
        assert!(matches!(
            err.reason(),
            Some(FailureReason::AuthExpiredRetryFailed(_))
        ));
    }
    assert_eq!(api.auth_calls(), 2);
}

#[tokio::test]
async fn test_one_field_failing_does_not_affect_others() {
    let api = Arc::new(MockApi::new(Box::new(|req| {
        if req.field_address == 3220 {
            return Err(support::network_error());
        }
        Ok(window(100, req))
    })));
    let engine = support::engine(&api);

    let outcomes = engine
        .retrieve_fields(&support::range(), DEVICE_ID, &[3219, 3220], 10_000)
        .await;

    assert_eq!(outcomes[0].1.as_ref().map(Vec::len).ok(), Some(100));
    assert!(outcomes[1].1.is_err());
}
