use super::*;

fn vars(
    url: Option<&str>,
    key: Option<&str>,
    request: Option<&str>,
    connect: Option<&str>,
) -> Result<BackendConfig, ConfigError> {
    BackendConfig::from_vars(
        url.map(ToOwned::to_owned),
        key.map(ToOwned::to_owned),
        request.map(ToOwned::to_owned),
        connect.map(ToOwned::to_owned),
    )
}

#[test]
fn minimal_vars_use_default_timeouts() {
    let cfg = vars(Some("https://backend.example.test"), Some("public-key"), None, None).unwrap();
    assert_eq!(cfg.base_url, "https://backend.example.test");
    assert_eq!(cfg.api_key, "public-key");
    assert_eq!(cfg.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

#[test]
fn trailing_slash_is_trimmed() {
    let cfg = vars(Some("https://backend.example.test/"), Some("k"), None, None).unwrap();
    assert_eq!(cfg.base_url, "https://backend.example.test");
}

#[test]
fn timeout_overrides_parse() {
    let cfg = vars(Some("http://localhost:54321"), Some("k"), Some("42"), Some("7")).unwrap();
    assert_eq!(cfg.request_timeout_secs, 42);
    assert_eq!(cfg.connect_timeout_secs, 7);
}

#[test]
fn garbage_timeouts_fall_back_to_defaults() {
    let cfg = vars(Some("http://localhost:54321"), Some("k"), Some("soon"), Some("")).unwrap();
    assert_eq!(cfg.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

#[test]
fn missing_url_errors() {
    let err = vars(None, Some("k"), None, None).unwrap_err();
    assert!(err.to_string().contains("BACKEND_URL"));
}

#[test]
fn missing_api_key_errors() {
    let err = vars(Some("https://backend.example.test"), None, None, None).unwrap_err();
    assert!(err.to_string().contains("BACKEND_API_KEY"));
}

#[test]
fn schemeless_url_errors() {
    let err = vars(Some("backend.example.test"), Some("k"), None, None).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "BACKEND_URL", .. }));
}
