//! Integration tests for cubby-core
//!
//! Covers the configuration surface, the id/token types at their
//! string and serde boundaries, and logging setup.

use cubby_core::config::MAX_INTERVAL_SECS;
use cubby_core::{
    init_logging, LogFormat, LoggingConfig, SessionConfig, SessionError, SessionId, SessionStore,
};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[test]
fn test_default_config_is_valid() {
    let config = SessionConfig::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.expiry_window_secs, 180);
    assert_eq!(config.gc_interval_secs, 60);
    assert_eq!(config.command_buffer, 1);
    assert_eq!(config.expiry_window(), Duration::from_secs(180));
    assert_eq!(config.gc_interval(), Duration::from_secs(60));
}

#[test]
fn test_validate_rejects_zero_expiry_window() {
    let config = SessionConfig {
        expiry_window_secs: 0,
        ..SessionConfig::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, SessionError::Config { .. }));
}

#[test]
fn test_validate_rejects_zero_gc_interval() {
    let config = SessionConfig {
        gc_interval_secs: 0,
        ..SessionConfig::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_command_buffer() {
    let config = SessionConfig {
        command_buffer: 0,
        ..SessionConfig::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_bounds_the_intervals() {
    let config = SessionConfig {
        expiry_window_secs: u64::MAX,
        ..SessionConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, SessionError::Config { .. }));

    let config = SessionConfig {
        gc_interval_secs: u64::MAX,
        ..SessionConfig::default()
    };
    assert!(config.validate().is_err());

    // The largest accepted intervals pass as-is.
    let config = SessionConfig {
        expiry_window_secs: MAX_INTERVAL_SECS,
        gc_interval_secs: MAX_INTERVAL_SECS,
        ..SessionConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_survives_a_toml_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("cubby.toml");

    let config = SessionConfig {
        expiry_window_secs: 45,
        gc_interval_secs: 10,
        command_buffer: 4,
    };
    config.save_to_file(&path).expect("Failed to save config");

    let loaded = SessionConfig::from_file(&path).expect("Failed to load config");
    assert_eq!(loaded.expiry_window_secs, 45);
    assert_eq!(loaded.gc_interval_secs, 10);
    assert_eq!(loaded.command_buffer, 4);
}

#[test]
fn test_from_file_reports_missing_file() {
    let err = SessionConfig::from_file("/nonexistent/cubby.toml").unwrap_err();
    assert!(matches!(err, SessionError::Config { .. }));
}

#[test]
fn test_session_id_string_round_trip() {
    let id = SessionId::generate();

    let parsed: SessionId = id.to_string().parse().expect("Failed to parse id");
    assert_eq!(parsed, id);
}

#[test]
fn test_session_id_rejects_malformed_input() {
    let err = "definitely-not-a-session-id".parse::<SessionId>().unwrap_err();

    assert!(matches!(err, SessionError::BadParameter { .. }));
    assert!(err.to_string().contains("definitely-not-a-session-id"));
}

#[test]
fn test_generated_ids_are_unique() {
    let ids: HashSet<SessionId> = (0..1000).map(|_| SessionId::generate()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn test_session_store_serializes_transparently() {
    let mut data = HashMap::new();
    data.insert("user".to_string(), "alice".to_string());
    let store = SessionStore {
        data,
        consistency_token: cubby_core::ConsistencyToken::generate(),
    };

    let value = serde_json::to_value(&store).expect("Failed to serialize store");
    assert_eq!(value["data"]["user"], "alice");
    // Tokens travel as bare UUID strings, not as wrapper objects.
    assert!(value["consistency_token"].is_string());

    let back: SessionStore = serde_json::from_value(value).expect("Failed to deserialize store");
    assert_eq!(back.consistency_token, store.consistency_token);
}

#[test]
fn test_errors_name_the_session() {
    let id = SessionId::generate();

    let not_found = SessionError::not_found(id);
    assert!(not_found.to_string().contains(&id.to_string()));

    let invalid_token = SessionError::invalid_token(id);
    assert!(invalid_token.to_string().contains(&id.to_string()));
}

#[test]
fn test_invalid_command_reports_the_reason() {
    let err = SessionError::invalid_command("unrecognized operation 'compact'");

    assert!(matches!(err, SessionError::InvalidCommand { .. }));
    assert!(err.to_string().contains("unrecognized operation 'compact'"));
}

#[test]
fn test_logging_config_parses_from_toml() {
    let raw = r#"
        level = "debug"
        format = "Json"
        include_location = false
        include_thread = true
        filter_directives = ["cubby_session=trace"]
    "#;

    let config: LoggingConfig = toml::from_str(raw).expect("Failed to parse logging config");
    assert!(matches!(config.format, LogFormat::Json));
    assert_eq!(config.level, "debug");
    assert_eq!(config.filter_directives.len(), 1);
}

#[test]
fn test_logging_rejects_bad_filter_directive() {
    let config = LoggingConfig {
        filter_directives: vec!["===not a directive===".to_string()],
        ..LoggingConfig::default()
    };

    assert!(init_logging(&config).is_err());
}

#[test]
fn test_logging_initializes() {
    let config = LoggingConfig {
        level: "error".to_string(),
        format: LogFormat::Compact,
        ..LoggingConfig::default()
    };

    assert!(init_logging(&config).is_ok());
}
