// Unit tests for engine configuration

use super::*;

#[test]
fn test_defaults() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.per_attempt_timeout_ms, 5_000);
    assert_eq!(cfg.wait_timeout_ms, 10_000);
    assert_eq!(cfg.poll_interval_ms, 500);
    assert_eq!(cfg.test_id_attribute, "data-testid");
    assert!(cfg.case_insensitive_names);
    assert!(cfg.clickable_classes.iter().any(|c| c == "mat-button"));
}

#[test]
fn test_duration_accessors() {
    let cfg = EngineConfig {
        per_attempt_timeout_ms: 1_500,
        poll_interval_ms: 250,
        ..Default::default()
    };
    assert_eq!(cfg.per_attempt_timeout(), Duration::from_millis(1_500));
    assert_eq!(cfg.poll_interval(), Duration::from_millis(250));
}

#[test]
fn test_partial_config_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"wait_timeout_ms": 30000}"#).unwrap();

    let cfg = EngineConfig::from_file(&path).unwrap();
    assert_eq!(cfg.wait_timeout_ms, 30_000);
    // Untouched keys fall back to defaults
    assert_eq!(cfg.per_attempt_timeout_ms, 5_000);
    assert_eq!(cfg.test_id_attribute, "data-testid");
}

#[test]
fn test_malformed_config_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(EngineConfig::from_file(&path).is_err());
}

#[test]
fn test_explicit_missing_path_errors() {
    let missing = std::path::Path::new("/nonexistent/webgrip-config.json");
    assert!(EngineConfig::load(Some(missing)).is_err());
}
