use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{error, info, instrument};

use crate::{errors::RelayError, types::ValidationData, utils::http_client};

/// Client for a relay host that runs the validation pipeline on a machine with
/// the attestation primitive and serves the result over HTTP.
///
/// The relay answers `POST` with the validation data as base64 text.
#[derive(Debug, Clone)]
pub struct RelayClient {
    url: String,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fetches one freshly generated validation data blob from the relay.
    ///
    /// # Errors
    ///
    /// * `RelayError::Request` if the relay cannot be reached
    /// * `RelayError::Status` if the relay answers with a non-success status,
    ///   which carries the relay's own error text
    /// * `RelayError::Decode` / `RelayError::Empty` if the body is not usable
    #[instrument(level = "info", name = "relay_validation_data", skip(self), fields(url = %self.url))]
    pub fn fetch_validation_data(&self) -> Result<ValidationData, RelayError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        let client = http_client(self.timeout).map_err(RelayError::Client)?;
        let response = client
            .post(&self.url)
            .headers(headers)
            .send()
            .map_err(|e| {
                error!(level = "relay", "Failed to send relay request: {e}");
                RelayError::Request(e)
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(level = "relay", "Relay request failed with status code {status}");
            return Err(RelayError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        let body = response.text()?;
        let data = decode_relay_body(&body)?;
        info!(
            level = "relay",
            validation_data_len = data.len(),
            "Received validation data from relay"
        );
        Ok(data)
    }
}

/// Decodes the base64 body returned by a relay.
pub fn decode_relay_body(body: &str) -> Result<ValidationData, RelayError> {
    let data = STANDARD.decode(body.trim())?;
    if data.is_empty() {
        return Err(RelayError::Empty);
    }
    Ok(ValidationData::new(data))
}
