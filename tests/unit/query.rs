//! Unit tests for the query model

use acelerate_client::query::{
    PageOptions, Query, QueryError, Selector, SortDirection, TimeRange, Timestamp,
};
use chrono::{FixedOffset, NaiveDate, TimeZone};

#[test]
fn test_canonical_scenario_query_string() {
    let range = TimeRange::new("2021-08-14T09:12:00", "2021-08-15T00:12:00").unwrap();
    let query = Query::new(range, Selector::new(8355, 3219), PageOptions::new(10_000).unwrap());

    assert_eq!(
        query.to_query_string(),
        "timestamp[$gt]=2021-08-14T09:12:00&timestamp[$lt]=2021-08-15T00:12:00&device_id=8355&field_address=3219&$limit=10000&$skip=0&$sort[timestamp]=1"
    );
}

#[test]
fn test_text_and_datetime_bounds_encode_identically() {
    let from_text = TimeRange::new("2021-08-14 09:12", "2021-08-15T00:12:00").unwrap();
    let start = NaiveDate::from_ymd_opt(2021, 8, 14)
        .unwrap()
        .and_hms_opt(9, 12, 0)
        .unwrap();
    let end = NaiveDate::from_ymd_opt(2021, 8, 15)
        .unwrap()
        .and_hms_opt(0, 12, 0)
        .unwrap();
    let from_values = TimeRange::new(start, end).unwrap();

    assert_eq!(from_text.query_string_tuple(), from_values.query_string_tuple());
}

#[test]
fn test_offset_is_preserved_in_encoding() {
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let start = offset.with_ymd_and_hms(2021, 8, 14, 9, 12, 0).unwrap();
    let range = TimeRange::new(start, "2021-08-15T00:12:00+02:00").unwrap();

    let (gt, lt) = range.query_string_tuple();
    assert_eq!(gt, "2021-08-14T09:12:00+02:00");
    assert_eq!(lt, "2021-08-15T00:12:00+02:00");
}

#[test]
fn test_start_after_end_is_rejected() {
    let err = TimeRange::new("2021-08-15T00:12:00", "2021-08-14T09:12:00").unwrap_err();
    assert!(matches!(err, QueryError::InvalidRange { .. }));
}

#[test]
fn test_equal_bounds_are_accepted() {
    assert!(TimeRange::new("2021-08-14T09:12:00", "2021-08-14T09:12:00").is_ok());
}

#[test]
fn test_malformed_bound_is_rejected() {
    let err = TimeRange::new("yesterday-ish", "2021-08-14T09:12:00").unwrap_err();
    assert_eq!(
        err,
        QueryError::MalformedTimestamp {
            input: "yesterday-ish".to_string()
        }
    );
}

#[test]
fn test_zero_page_size_is_rejected() {
    assert_eq!(PageOptions::new(0).unwrap_err(), QueryError::InvalidPageSize);
}

#[test]
fn test_page_options_defaults() {
    let options = PageOptions::default();
    assert_eq!(options.limit(), 10_000);
    assert_eq!(options.skip(), 0);
    assert_eq!(options.sort(), SortDirection::Ascending);
    assert_eq!(options.to_string(), "|LIMIT: 10000|SKIP: 0|SORT: 1|");
}

#[test]
fn test_selector_display() {
    assert_eq!(
        Selector::new(8355, 3219).to_string(),
        "|DEVICE_ID: 8355|FIELD_ADDRESS: 3219|"
    );
}

#[test]
fn test_timestamp_z_suffix_normalizes_to_utc_offset() {
    let ts = Timestamp::parse("2021-08-14T09:12:00Z").unwrap();
    assert_eq!(ts.to_iso_string(), "2021-08-14T09:12:00+00:00");
}
