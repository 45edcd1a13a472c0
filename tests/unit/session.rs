//! Unit tests for the session lifecycle

use acelerate_client::session::{Authorizer, SessionError, SessionState};
use std::sync::Arc;

use crate::support::{self, MockApi};

#[tokio::test]
async fn test_authorize_posts_local_strategy_to_project_subdomain() {
    let api = Arc::new(MockApi::paged(0));
    let session = support::session(&api);

    let header = session.authorize().await.unwrap();

    assert_eq!(header.as_str(), "Bearer token-1");
    assert_eq!(session.state().await, SessionState::Authorized);
    assert_eq!(
        api.auth_urls(),
        vec!["https://nice.sr.dispatcher.acelerex.com/api/authentication".to_string()]
    );
    let body = &api.auth_bodies()[0];
    assert_eq!(body["strategy"], "local");
    assert_eq!(body["email"], "ops@example.com");
    assert_eq!(body["password"], "hunter2");
}

#[tokio::test]
async fn test_rejected_credentials() {
    let api = Arc::new(MockApi::paged(0));
    api.set_auth_status(401);
    let session = support::session(&api);

    let err = session.authorize().await.unwrap_err();

    match &err {
        SessionError::AuthorizationFailed { project, email, .. } => {
            assert_eq!(project, "NICE");
            assert_eq!(email, "ops@example.com");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.to_string().contains("hunter2"));
    assert_eq!(session.state().await, SessionState::Unauthenticated);
    assert_eq!(
        session.authorized_header().await.unwrap_err(),
        SessionError::NotAuthorized
    );
}

#[tokio::test]
async fn test_unauthenticated_session_has_no_header() {
    let api = Arc::new(MockApi::paged(0));
    let session = support::session(&api);
    assert_eq!(session.state().await, SessionState::Unauthenticated);
    assert_eq!(
        session.authorized_header().await.unwrap_err(),
        SessionError::NotAuthorized
    );
    assert_eq!(api.auth_calls(), 0);
}

#[tokio::test]
async fn test_reauthorize_issues_fresh_token() {
    let api = Arc::new(MockApi::paged(0));
    let session = support::session(&api);

    let first = session.ensure_authorized().await.unwrap();
    let second = session.reauthorize(&first).await.unwrap();

    assert_eq!(second.as_str(), "Bearer token-2");
    assert!(second.generation() > first.generation());
    assert_eq!(session.authorized_header().await.unwrap(), second);
}

#[tokio::test]
async fn test_concurrent_reauthorize_coalesces() {
    let api = Arc::new(MockApi::paged(0));
    let session = support::session(&api);
    let stale = session.ensure_authorized().await.unwrap();

    let (a, b, c) = tokio::join!(
        session.reauthorize(&stale),
        session.reauthorize(&stale),
        session.reauthorize(&stale)
    );

    assert_eq!(api.auth_calls(), 2);
    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
}
