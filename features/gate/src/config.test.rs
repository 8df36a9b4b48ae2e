use super::*;
use llm_mute_error::ErrorExt;
use llm_mute_error::StatusCode;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = LlmMuteConfig::default();
    assert!(config.persistence.enabled);
    assert_eq!(config.persistence.path, PathBuf::from("data/llm_mute/data.json"));
    assert!(config.mute_command.enabled);
    assert_eq!(config.mute_command.default_duration(), Duration::from_secs(3600));
    assert_eq!(config.llm_interval.min_interval(), Duration::ZERO);
}

#[test]
fn test_empty_object_uses_defaults() {
    let config = LlmMuteConfig::from_json_str("{}").unwrap();
    assert_eq!(config, LlmMuteConfig::default());
}

#[test]
fn test_partial_sections() {
    let config = LlmMuteConfig::from_json_str(
        r#"{
            "persistence": { "enabled": false },
            "mute_command": { "default_duration": 60 },
            "llm_interval": { "interval": 5 }
        }"#,
    )
    .unwrap();

    assert!(!config.persistence.enabled);
    assert_eq!(config.persistence.path, PathBuf::from(DEFAULT_SNAPSHOT_PATH));
    assert!(config.mute_command.enabled);
    assert_eq!(config.mute_command.default_duration, 60);
    assert_eq!(config.llm_interval.min_interval(), Duration::from_secs(5));
}

#[test]
fn test_negative_duration_is_rejected() {
    let err = LlmMuteConfig::from_json_str(r#"{"mute_command": {"default_duration": -1}}"#)
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::InvalidConfig);
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("llm_mute.json");
    std::fs::write(&path, r#"{"llm_interval": {"interval": 30}}"#).unwrap();

    let config = LlmMuteConfig::from_file(&path).unwrap();
    assert_eq!(config.llm_interval.interval, 30);
}

#[test]
fn test_from_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = LlmMuteConfig::from_file(&dir.path().join("missing.json")).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::ConfigFileError);
}
