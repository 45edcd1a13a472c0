//! Unit tests for response parsing

use acelerate_client::api::{ApiError, ResponseParser};
use acelerate_client::retrieval::Progress;
use serde_json::json;

use crate::support::row;

#[test]
fn test_page_records_keep_server_order() {
    let body = json!({
        "total": 25000,
        "limit": 10000,
        "skip": 10000,
        "data": [row(10000), row(10001), row(10002)]
    })
    .to_string();

    let page = ResponseParser::parse_data_page(&body).unwrap();
    assert_eq!(page.progress, Progress::new(25_000, 10_000, 10_000));
    let values: Vec<Option<f64>> = page.records.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![Some(10000.0), Some(10001.0), Some(10002.0)]);
    assert_eq!(page.records[0].timestamp.to_iso_string(), "2021-08-14T11:58:40");
}

#[test]
fn test_missing_total_is_parse_error() {
    let body = json!({ "data": [] }).to_string();
    assert!(matches!(
        ResponseParser::parse_data_page(&body),
        Err(ApiError::Parse(_))
    ));
}

#[test]
fn test_missing_data_is_parse_error() {
    let body = json!({ "total": 1 }).to_string();
    assert!(matches!(
        ResponseParser::parse_data_page(&body),
        Err(ApiError::Parse(_))
    ));
}

#[test]
fn test_bad_row_names_its_index() {
    let mut bad = row(1);
    bad["value"] = json!("not a number");
    let body = json!({ "total": 2, "data": [row(0), bad] }).to_string();

    match ResponseParser::parse_data_page(&body) {
        Err(ApiError::Parse(message)) => assert!(message.starts_with("Invalid row 1")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_null_reading_does_not_fail_page() {
    let mut gap = row(1);
    gap["value"] = json!(null);
    let body = json!({ "total": 3, "data": [row(0), gap, row(2)] }).to_string();

    let page = ResponseParser::parse_data_page(&body).unwrap();
    let values: Vec<Option<f64>> = page.records.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![Some(0.0), None, Some(2.0)]);
}

#[test]
fn test_empty_page() {
    let body = json!({ "total": 0, "limit": 10000, "skip": 0, "data": [] }).to_string();
    let page = ResponseParser::parse_data_page(&body).unwrap();
    assert!(page.records.is_empty());
    assert!(page.is_complete());
}

#[test]
fn test_access_token_extraction() {
    assert_eq!(
        ResponseParser::parse_access_token(r#"{"accessToken":"abc.def.ghi"}"#).as_deref(),
        Some("abc.def.ghi")
    );
    assert_eq!(ResponseParser::parse_access_token(r#"{"message":"nope"}"#), None);
}
