use super::*;
use pretty_assertions::assert_eq;
use snafu::ResultExt;

#[test]
fn test_read_config_error() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let err = Err::<(), _>(io)
        .context(gate_error::ReadConfigSnafu {
            path: PathBuf::from("/etc/llm_mute.json"),
        })
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::ConfigFileError);
    assert!(err.to_string().contains("/etc/llm_mute.json"));
}

#[test]
fn test_write_snapshot_error_is_logged_as_io() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let err = Err::<(), _>(io)
        .context(gate_error::WriteSnapshotSnafu {
            path: PathBuf::from("data/llm_mute/data.json"),
        })
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::IoError);
    assert!(err.status_code().should_log_error());
}

#[test]
fn test_parse_config_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = Err::<(), _>(json_err)
        .context(gate_error::ParseConfigSnafu)
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::InvalidConfig);
    assert!(err.to_string().starts_with("Invalid config"));
}
