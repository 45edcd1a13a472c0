//! Settings from the environment

use acelerate_client::config::{ConfigError, ConfigSource, EnvConfigSource};
use acelerate_client::query::Selector;

fn set_all(prefix: &str) {
    for (name, value) in [
        ("PROJECT", "NICE"),
        ("EMAIL", "ops@example.com"),
        ("PASSWORD", "hunter2"),
        ("DEVICE_ID", "8355"),
        ("FIELD_ADDRESSES", "3219, 3220,"),
        ("T_START", "2021-08-10T02:00:00"),
        ("T_END", "2021-08-10T17:30:00"),
    ] {
        std::env::set_var(format!("{prefix}_{name}"), value);
    }
}

#[test]
fn test_env_source_loads_settings() {
    set_all("ACELERATE_IT_FULL");
    std::env::set_var("ACELERATE_IT_FULL_PAGE_SIZE", "5000");

    let settings = EnvConfigSource::with_prefix("ACELERATE_IT_FULL").load().unwrap();

    assert_eq!(settings.project, "NICE");
    assert_eq!(settings.page_size, 5_000);
    assert_eq!(
        settings.selectors(),
        vec![Selector::new(8355, 3219), Selector::new(8355, 3220)]
    );
    assert!(settings.time_range().is_ok());
    assert!(!format!("{settings:?}").contains("hunter2"));
}

#[test]
fn test_env_source_default_page_size() {
    set_all("ACELERATE_IT_DEFAULT");
    let settings = EnvConfigSource::with_prefix("ACELERATE_IT_DEFAULT").load().unwrap();
    assert_eq!(settings.page_size, 10_000);
}

#[test]
fn test_env_source_rejects_bad_number() {
    set_all("ACELERATE_IT_BAD");
    std::env::set_var("ACELERATE_IT_BAD_DEVICE_ID", "eighty");

    let err = EnvConfigSource::with_prefix("ACELERATE_IT_BAD").load().unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Invalid { ref key, .. } if key == "ACELERATE_IT_BAD_DEVICE_ID"
    ));
}
