/// Default URL of the validation certificate document.
///
/// The document is a property list whose `cert` entry carries the certificate
/// bytes handed to the attestation context on initialization.
pub const VALIDATION_CERT_URL: &str =
    "http://static.ess.apple.com/identity/validation/cert-1.0.plist";

/// Default URL of the session-info handshake endpoint.
///
/// Used when the certificate document does not describe its own endpoint.
pub const INITIALIZE_VALIDATION_URL: &str =
    "https://identity.ess.apple.com/WebObjects/TDIdentityService.woa/wa/initializeValidation";

/// Environment variable overriding [`VALIDATION_CERT_URL`].
pub const VALIDATION_CERT_URL_KEY: &str = "NAC_VALIDATION_CERT_URL";

/// Environment variable overriding [`INITIALIZE_VALIDATION_URL`].
pub const INITIALIZE_VALIDATION_URL_KEY: &str = "NAC_INITIALIZE_VALIDATION_URL";

/// Certificate bytes in the certificate document.
pub const CERT_KEY: &str = "cert";

/// Optional session endpoint in the certificate document.
pub const INITIALIZE_VALIDATION_URL_DOC_KEY: &str = "initialize-validation-url";

/// Init blob in the session request.
pub const SESSION_INFO_REQUEST_KEY: &str = "session-info-request";

/// Hardware identifiers in the session request.
pub const DEVICE_INFO_KEY: &str = "device-info";

/// Session-info payload in the session response.
pub const SESSION_INFO_KEY: &str = "session-info";

/// Status in the session response.
pub const STATUS_KEY: &str = "status";

/// Status value reported by the service on success.
///
/// A response without a `status` entry is treated as carrying this value.
pub const STATUS_SUCCESS: i64 = 0;

/// Content type of every property list request body.
pub const PLIST_CONTENT_TYPE: &str = "application/x-apple-plist";

/// Main logic board serial header.
pub const MLB_HEADER: &str = "X-Apple-I-MLB";

/// EFI ROM header, lowercase hex.
pub const ROM_HEADER: &str = "X-Apple-I-ROM";

/// Serial number header.
pub const SERIAL_NUMBER_HEADER: &str = "X-Apple-I-SRL-NO";
