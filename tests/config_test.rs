//! Integration tests for layered configuration
//!
//! Defaults, then a TOML file, then `TABLEBOOK__*` environment variables.

use serial_test::serial;
use std::io::Write;
use tablebook_core::{Settings, TablebookError};
use tempfile::NamedTempFile;

const ENV_VARS: &[&str] = &[
    "TABLEBOOK__API__ADDR",
    "TABLEBOOK__BOOKING__MAX_PARTY_SIZE",
    "TABLEBOOK__LOGGING__FILTER",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_defaults_without_file() {
    clear_env();

    let settings = Settings::load(None).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.catalog().unwrap().time_slots().len(), 11);
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    clear_env();

    let file = write_config(
        r#"
[catalog]
opening = "17:00"
closing = "22:00"
slot_interval_minutes = 30

[[catalog.tables]]
number = 1
capacity = 2
location = "Bar"

[[catalog.tables]]
number = 2
capacity = 12

[booking]
max_party_size = 12

[api]
addr = "0.0.0.0:8080"
"#,
    );

    let settings = Settings::load(Some(file.path())).unwrap();
    let catalog = settings.catalog().unwrap();

    assert_eq!(catalog.tables().len(), 2);
    assert_eq!(catalog.max_capacity(), 12);
    assert_eq!(catalog.time_slots().len(), 11);
    assert!(catalog.is_valid_slot("17:30"));
    assert!(catalog.is_valid_slot("22:00"));
    assert_eq!(settings.booking_policy().max_party_size, 12);
    assert_eq!(settings.api_addr().unwrap().port(), 8080);

    // Untouched sections keep their defaults
    assert_eq!(settings.api.heartbeat_secs, 10);
    assert_eq!(settings.logging.filter, "info");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();

    let file = write_config(
        r#"
[api]
addr = "127.0.0.1:4000"
"#,
    );

    std::env::set_var("TABLEBOOK__API__ADDR", "127.0.0.1:5000");
    std::env::set_var("TABLEBOOK__BOOKING__MAX_PARTY_SIZE", "6");
    std::env::set_var("TABLEBOOK__LOGGING__FILTER", "debug");

    let settings = Settings::load(Some(file.path()));
    clear_env();
    let settings = settings.unwrap();

    assert_eq!(settings.api_addr().unwrap().port(), 5000);
    assert_eq!(settings.booking.max_party_size, 6);
    assert_eq!(settings.logging.filter, "debug");
}

#[test]
#[serial]
fn test_invalid_files_are_rejected() {
    clear_env();

    let missing = std::env::temp_dir().join("tablebook-does-not-exist.toml");
    assert!(matches!(
        Settings::load(Some(&missing)),
        Err(TablebookError::Config(_))
    ));

    let duplicate_tables = write_config(
        r#"
[[catalog.tables]]
number = 1
capacity = 2

[[catalog.tables]]
number = 1
capacity = 4
"#,
    );
    assert!(Settings::load(Some(duplicate_tables.path())).is_err());

    let zero_party = write_config(
        r#"
[booking]
max_party_size = 0
"#,
    );
    assert!(Settings::load(Some(zero_party.path())).is_err());
}

#[test]
#[serial]
fn test_effective_config_round_trips_through_file() {
    clear_env();

    let mut settings = Settings::default();
    settings.catalog.time_slots = Some(vec!["18:00".to_string(), "20:00".to_string()]);
    let file = write_config(&settings.to_toml().unwrap());

    let loaded = Settings::load(Some(file.path())).unwrap();
    assert_eq!(loaded, settings);
}
