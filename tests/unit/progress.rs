//! Unit tests for progress arithmetic

use acelerate_client::query::PageOptions;
use acelerate_client::retrieval::Progress;

#[test]
fn test_progress_over_three_pages() {
    let start = Progress::new(25_000, 10_000, 0);
    let first = start.advance(10_000);
    let second = first.advance(10_000);
    let third = second.advance(5_000);

    assert_eq!(first.to_string(), "40%");
    assert_eq!(second.to_string(), "80%");
    assert_eq!(third.to_string(), "100%");
    assert!(!second.is_complete());
    assert!(third.is_complete());
}

#[test]
fn test_percent_is_floored() {
    assert_eq!(Progress::new(3, 1, 1).percent_complete(), 33);
    assert_eq!(Progress::new(3, 1, 2).percent_complete(), 66);
}

#[test]
fn test_empty_result_is_complete() {
    let progress = Progress::new(0, 10_000, 0);
    assert!(progress.is_complete());
    assert_eq!(progress.percent_complete(), 100);
}

#[test]
fn test_percent_caps_at_100_when_total_shrinks() {
    assert_eq!(Progress::new(10, 10, 12).percent_complete(), 100);
}

#[test]
fn test_next_page_uses_records_received() {
    let options = PageOptions::new(10_000).unwrap();
    let short = Progress::new(25_000, 10_000, 0).advance(7_500);
    assert_eq!(short.next_page(options).skip(), 7_500);
    assert_eq!(short.next_page(options).limit(), 10_000);
}

#[test]
fn test_status_summary() {
    let status = Progress::new(25_000, 10_000, 10_000).status();
    assert_eq!(status.total_samples, 25_000);
    assert_eq!(status.retrieved_samples, 10_000);
    assert_eq!(status.progress, "40%");
    assert!(!status.is_complete);

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["progress"], "40%");
}
