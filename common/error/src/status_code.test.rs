use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_status_code_values() {
    assert_eq!(StatusCode::IoError as i32, 03_000);
    assert_eq!(StatusCode::InvalidConfig as i32, 10_000);
    assert_eq!(StatusCode::Muted as i32, 12_000);
    assert_eq!(StatusCode::Busy as i32, 12_002);
}

#[test]
fn test_only_transient_rejections_are_retryable() {
    assert!(StatusCode::RateLimited.is_retryable());
    assert!(StatusCode::Busy.is_retryable());
    assert!(!StatusCode::Muted.is_retryable());
    assert!(!StatusCode::IoError.is_retryable());
}

#[test]
fn test_should_log_error() {
    assert!(StatusCode::IoError.should_log_error());
    assert!(StatusCode::SerializeError.should_log_error());
    assert!(!StatusCode::InvalidConfig.should_log_error());
    assert!(!StatusCode::Muted.should_log_error());
}

#[test]
fn test_display_matches_variant_name() {
    assert_eq!(StatusCode::ConfigFileError.to_string(), "ConfigFileError");
    assert_eq!(StatusCode::Busy.to_string(), "Busy");
}
