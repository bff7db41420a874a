//! Error construction, display and classification.

use posit8_xcheck::Error;

#[test]
fn test_device_error_creation() {
    let err = Error::device("exit status: 2");
    assert_eq!(err.to_string(), "Device error: exit status: 2");
    assert!(err.is_retryable(), "device failures may be transient");
}

#[test]
fn test_device_error_with_source() {
    let source = std::io::Error::other("broken pipe");
    let err = Error::device_with_source("failed to run './dev'", source);
    assert!(err.to_string().contains("./dev"));
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.is_retryable());
}

#[test]
fn test_config_error() {
    let err = Error::config("jobs must be at least 1");
    assert_eq!(
        err.to_string(),
        "Configuration error: jobs must be at least 1"
    );
    assert!(!err.is_retryable());
}

#[test]
fn test_table_error() {
    let err = Error::table(7, "'x' is not a number");
    match &err {
        Error::Table { line, message } => {
            assert_eq!(*line, 7);
            assert_eq!(message, "'x' is not a number");
        }
        _ => unreachable!("Expected Table error"),
    }
    assert!(!err.is_retryable());
}

#[test]
fn test_timeout_error() {
    let err = Error::Timeout { millis: 10_000 };
    assert_eq!(err.to_string(), "Device timed out after 10000ms");
    assert!(err.is_retryable());
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: Error = io.into();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.is_retryable());
}

#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: Error = json_err.into();
    assert!(err.to_string().starts_with("Serialization error"));
    assert!(!err.is_retryable());
}

#[test]
fn test_toml_error_conversion() {
    let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
    let err: Error = toml_err.into();
    assert!(err.to_string().starts_with("TOML parse error"));
    assert!(!err.is_retryable());
}

#[test]
fn test_core_error_conversion() {
    let err: Error = posit8_core::Error::invalid_bits("1012", "bad digit").into();
    assert!(err.to_string().contains("1012"));
    assert!(!err.is_retryable());
}
