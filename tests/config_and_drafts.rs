// tests/config_and_drafts.rs

use std::io::Write;

use tempfile::NamedTempFile;

use batchroute::batch::load_draft;
use batchroute::config::loader::apply_env_overrides;
use batchroute::config::{ConfigFile, load_and_validate, load_from_path};
use batchroute::errors::BatchrouteError;

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_file_is_loaded() {
    let file = toml_file(
        r#"
[server]
base_url = "https://routes.example.com/api"
timeout_secs = 10

[polling]
interval_ms = 1500
fetch_immediately = true
max_consecutive_failures = 5

[map]
fallback_center = [40.4168, -3.7038]
zoom = 11
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.server.base_url, "https://routes.example.com/api");
    assert_eq!(cfg.server.timeout_secs, 10);
    assert_eq!(cfg.polling.interval_ms, 1500);
    assert!(cfg.polling.fetch_immediately);
    assert_eq!(cfg.polling.max_consecutive_failures, Some(5));
    assert_eq!(cfg.map.zoom, 11);
}

#[test]
fn empty_config_file_uses_defaults() {
    let file = toml_file("");
    let raw = load_from_path(file.path()).unwrap();
    let cfg = ConfigFile::try_from(raw).unwrap();

    assert_eq!(cfg.server.base_url, "http://localhost:8000/api");
    assert_eq!(cfg.polling.interval_ms, 3000);
    assert_eq!(cfg.polling.max_consecutive_failures, None);
    assert_eq!(cfg.map.fallback_center, [18.4861, -69.9312]);
    assert_eq!(cfg.map.zoom, 13);
}

#[test]
fn bad_values_are_config_errors() {
    let cases = [
        "[server]\nbase_url = \"ftp://example.com\"",
        "[server]\ntimeout_secs = 0",
        "[polling]\ninterval_ms = 0",
        "[map]\nfallback_center = [95.0, 0.0]",
        "[map]\nzoom = 40",
    ];

    for contents in cases {
        let file = toml_file(contents);
        match load_and_validate(file.path()) {
            Err(BatchrouteError::ConfigError(_)) => {}
            other => panic!("expected config error for {contents:?}, got {other:?}"),
        }
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = toml_file("[polling\ninterval_ms = ");
    assert!(matches!(
        load_from_path(file.path()),
        Err(BatchrouteError::TomlError(_))
    ));
}

#[test]
fn missing_explicit_config_is_an_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/Batchroute.toml"),
        Err(BatchrouteError::IoError(_))
    ));
}

#[test]
fn env_token_overrides_file_token() {
    let file = toml_file("[server]\napi_token = \"from-file\"");
    let mut raw = load_from_path(file.path()).unwrap();

    apply_env_overrides(&mut raw, Some("   ".to_string()));
    assert_eq!(raw.server.api_token.as_deref(), Some("from-file"));

    apply_env_overrides(&mut raw, Some("from-env".to_string()));
    assert_eq!(raw.server.api_token.as_deref(), Some("from-env"));
}

#[test]
fn draft_file_round_trips_into_a_request() {
    let file = toml_file(
        r#"
name = "Ruta AM"
delivery_date = "2024-05-01"
depot_address = "Av. X"

[[deliveries]]
address = "Calle 1"
phone = "(809) 555-0101"

[[deliveries]]
address = "Calle 2"
"#,
    );

    let draft = load_draft(file.path()).unwrap();
    assert_eq!(draft.deliveries.len(), 2);
    assert_eq!(draft.deliveries[1].phone, "");

    let request = draft.validate().unwrap();
    assert_eq!(request.deliveries[0].phone, "(809) 555-0101");
}

#[test]
fn partial_draft_names_the_missing_field() {
    let file = toml_file("name = \"Ruta AM\"\n");
    let draft = load_draft(file.path()).unwrap();

    let err = draft.validate().unwrap_err();
    assert_eq!(err.field(), Some("delivery_date"));
}
