use crate::constants::{
    INITIALIZE_VALIDATION_URL, INITIALIZE_VALIDATION_URL_KEY, VALIDATION_CERT_URL,
    VALIDATION_CERT_URL_KEY,
};

/// Resolves a setting from an explicit value, then the environment, then a default.
///
/// Empty environment values are ignored.
pub fn resolve_setting(explicit: Option<&str>, env_key: &str, default: &str) -> String {
    if let Some(value) = explicit {
        return value.to_string();
    }
    match std::env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

/// URL of the validation certificate document.
///
/// Falls back to the `NAC_VALIDATION_CERT_URL` environment variable, then to
/// [`VALIDATION_CERT_URL`].
pub fn get_validation_cert_url(explicit: Option<&str>) -> String {
    resolve_setting(explicit, VALIDATION_CERT_URL_KEY, VALIDATION_CERT_URL)
}

/// URL of the session-info handshake used when the certificate names none.
///
/// Falls back to the `NAC_INITIALIZE_VALIDATION_URL` environment variable, then
/// to [`INITIALIZE_VALIDATION_URL`].
pub fn get_initialize_validation_url(explicit: Option<&str>) -> String {
    resolve_setting(
        explicit,
        INITIALIZE_VALIDATION_URL_KEY,
        INITIALIZE_VALIDATION_URL,
    )
}

/// Builds the blocking HTTP client used for one request.
///
/// No timeout is applied unless one is given; callers bound the whole run.
pub fn http_client(
    timeout: Option<std::time::Duration>,
) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder().timeout(timeout).build()
}
