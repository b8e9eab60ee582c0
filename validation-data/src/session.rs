use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::{error, info, instrument};

use crate::{
    constants::{
        DEVICE_INFO_KEY, MLB_HEADER, PLIST_CONTENT_TYPE, ROM_HEADER, SERIAL_NUMBER_HEADER,
        SESSION_INFO_KEY, SESSION_INFO_REQUEST_KEY, STATUS_KEY, STATUS_SUCCESS,
    },
    document::StructuredDocument,
    errors::{DocumentError, NegotiationError},
    pipeline::ValidationOptions,
    types::{HardwareIdentity, SessionInfo, ValidationCertificate},
    utils::http_client,
};

/// Performs the session-info handshake with the validation service.
pub trait SessionNegotiator: Send + Sync {
    fn negotiate(
        &self,
        certificate: &ValidationCertificate,
        identity: &HardwareIdentity,
        init_blob: &[u8],
    ) -> Result<SessionInfo, NegotiationError>;
}

/// Negotiates over a single HTTP POST carrying property list bodies.
#[derive(Debug, Default, Clone)]
pub struct HttpSessionNegotiator {
    timeout: Option<Duration>,
}

impl HttpSessionNegotiator {
    pub fn new(options: &ValidationOptions) -> Self {
        Self {
            timeout: options.timeout,
        }
    }
}

impl SessionNegotiator for HttpSessionNegotiator {
    #[instrument(
        level = "info",
        name = "negotiate_session",
        skip_all,
        fields(url = %certificate.session_url, init_blob_len = init_blob.len())
    )]
    fn negotiate(
        &self,
        certificate: &ValidationCertificate,
        identity: &HardwareIdentity,
        init_blob: &[u8],
    ) -> Result<SessionInfo, NegotiationError> {
        let body = build_session_request(identity, init_blob)
            .to_xml()
            .map_err(NegotiationError::Malformed)?;
        let client = http_client(self.timeout)
            .map_err(|e| NegotiationError::Capability(format!("failed to build HTTP client: {e}")))?;

        let response = client
            .post(certificate.session_url.clone())
            .headers(identity_headers(identity))
            .body(body)
            .send()
            .map_err(|e| {
                error!(
                    level = "session",
                    "Failed to send session request: {e}"
                );
                NegotiationError::Transport(e.to_string())
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(
                level = "session",
                "Session request failed with status code {status}"
            );
            return Err(NegotiationError::Transport(format!("HTTP {status}: {body}")));
        }
        let body = response
            .bytes()
            .map_err(|e| NegotiationError::Transport(format!("failed to read body: {e}")))?;

        let session = parse_session_response(&body).map_err(|e| {
            error!(level = "session", "Session negotiation failed: {e}");
            e
        })?;
        info!(
            level = "session",
            session_info_len = session.session_info.len(),
            "Session negotiated"
        );
        Ok(session)
    }
}

/// Builds the session request document.
///
/// The init blob goes under `session-info-request`; the identifiers the source
/// could read go under `device-info`, which is omitted when empty.
pub fn build_session_request(identity: &HardwareIdentity, init_blob: &[u8]) -> StructuredDocument {
    let mut device_info = StructuredDocument::new();
    let strings = [
        ("product-name", &identity.product_name),
        ("serial-number", &identity.serial_number),
        ("platform-uuid", &identity.platform_uuid),
        ("board-id", &identity.board_id),
        ("os-build", &identity.os_build),
        ("os-version", &identity.os_version),
        ("mlb", &identity.mlb),
        ("root-disk-uuid", &identity.root_disk_uuid),
    ];
    for (key, value) in strings {
        if let Some(value) = value {
            device_info.insert_string(key, value.clone());
        }
    }
    if let Some(rom) = &identity.rom {
        device_info.insert_data("rom", rom.clone());
    }
    if let Some(mac) = &identity.mac_address {
        device_info.insert_data("mac-address", mac.clone());
    }

    let mut request = StructuredDocument::new();
    request.insert_data(SESSION_INFO_REQUEST_KEY, init_blob.to_vec());
    if !device_info.is_empty() {
        request.insert_document(DEVICE_INFO_KEY, device_info);
    }
    request
}

/// Hardware headers sent alongside the session request.
fn identity_headers(identity: &HardwareIdentity) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(PLIST_CONTENT_TYPE));
    let values = [
        (MLB_HEADER, identity.mlb.clone()),
        (ROM_HEADER, identity.rom_hex()),
        (SERIAL_NUMBER_HEADER, identity.serial_number.clone()),
    ];
    for (name, value) in values {
        // Identifiers that are not valid header values are left out.
        if let Some(value) = value.and_then(|v| HeaderValue::from_str(&v).ok()) {
            headers.insert(name, value);
        }
    }
    headers
}

/// Validates a session response.
///
/// Successful `initializeValidation` responses carry only `session-info` and
/// omit `status`, so a missing `status` counts as success. A present status
/// must be an integer equal to [`STATUS_SUCCESS`]; anything else is reported
/// as a rejection before `session-info` is looked at.
pub fn parse_session_response(bytes: &[u8]) -> Result<SessionInfo, NegotiationError> {
    let document = StructuredDocument::parse(bytes).map_err(NegotiationError::Malformed)?;
    let status = document
        .optional_integer(STATUS_KEY)
        .map_err(NegotiationError::Malformed)?
        .unwrap_or(STATUS_SUCCESS);
    if status != STATUS_SUCCESS {
        return Err(NegotiationError::Rejected { status });
    }
    let session_info = match document.required_data(SESSION_INFO_KEY) {
        Ok(data) if !data.is_empty() => data.to_vec(),
        Ok(_) | Err(DocumentError::MissingField(_)) => {
            return Err(NegotiationError::MissingSessionInfo)
        }
        Err(e) => return Err(NegotiationError::Malformed(e)),
    };
    Ok(SessionInfo {
        status,
        session_info,
    })
}
