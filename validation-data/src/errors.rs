use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Renders an optional message as a `": message"` suffix.
fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// The single failure outcome of a validation data run.
///
/// Every variant corresponds to exactly one failure point of the pipeline and
/// carries a stable numeric code (see [`PipelineError::code`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Failed to load certificate capability{}", detail(.message))]
    CapabilityLoad { message: Option<String> },
    #[error("Failed to fetch validation certificate{}", detail(.message))]
    CertificateFetch { message: Option<String> },
    #[error("Invalid validation certificate document{}", detail(.message))]
    CertificateMalformed { message: Option<String> },
    #[error("Attestation capability not found{}", detail(.message))]
    AttestationUnavailable { message: Option<String> },
    #[error("Attestation context initialization failed{}", detail(.message))]
    ContextInit { message: Option<String> },
    #[error("Session negotiation request failed{}", detail(.message))]
    SessionRequest { message: Option<String> },
    #[error("Invalid session negotiation response{}", detail(.message))]
    SessionMalformed { message: Option<String> },
    #[error("Session negotiation rejected{}", detail(.message))]
    SessionRejected { message: Option<String> },
    #[error("Session negotiation response missing session-info{}", detail(.message))]
    SessionInfoMissing { message: Option<String> },
    #[error("Key establishment failed{}", detail(.message))]
    KeyEstablishment { message: Option<String> },
    #[error("Signing failed{}", detail(.message))]
    Sign { message: Option<String> },
}

/// Coarse classification of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A prerequisite component is missing or misconfigured
    Environment,
    /// Transport-level failure
    Network,
    /// A document failed structural parsing
    Format,
    /// A well-formed response rejected the request
    Protocol,
    /// The attestation primitive reported failure
    Primitive,
}

impl PipelineError {
    /// Stable numeric code, `1..=11`.
    pub fn code(&self) -> i32 {
        match self {
            Self::CapabilityLoad { .. } => 1,
            Self::CertificateFetch { .. } => 2,
            Self::CertificateMalformed { .. } => 3,
            Self::AttestationUnavailable { .. } => 4,
            Self::ContextInit { .. } => 5,
            Self::SessionRequest { .. } => 6,
            Self::SessionMalformed { .. } => 7,
            Self::SessionRejected { .. } => 8,
            Self::SessionInfoMissing { .. } => 9,
            Self::KeyEstablishment { .. } => 10,
            Self::Sign { .. } => 11,
        }
    }

    /// Descriptive message, when the failing stage provided one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::CapabilityLoad { message }
            | Self::CertificateFetch { message }
            | Self::CertificateMalformed { message }
            | Self::AttestationUnavailable { message }
            | Self::ContextInit { message }
            | Self::SessionRequest { message }
            | Self::SessionMalformed { message }
            | Self::SessionRejected { message }
            | Self::SessionInfoMissing { message }
            | Self::KeyEstablishment { message }
            | Self::Sign { message } => message.as_deref(),
        }
    }

    /// Consumes the error, yielding the `(code, message)` pair.
    pub fn into_parts(self) -> (i32, Option<String>) {
        let code = self.code();
        let message = match self {
            Self::CapabilityLoad { message }
            | Self::CertificateFetch { message }
            | Self::CertificateMalformed { message }
            | Self::AttestationUnavailable { message }
            | Self::ContextInit { message }
            | Self::SessionRequest { message }
            | Self::SessionMalformed { message }
            | Self::SessionRejected { message }
            | Self::SessionInfoMissing { message }
            | Self::KeyEstablishment { message }
            | Self::Sign { message } => message,
        };
        (code, message)
    }

    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            1 | 4 => ErrorCategory::Environment,
            2 | 6 => ErrorCategory::Network,
            3 | 7 => ErrorCategory::Format,
            8 | 9 => ErrorCategory::Protocol,
            _ => ErrorCategory::Primitive,
        }
    }
}

/// Aggregate failure of a hardware identity source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to read hardware identity: {0}")]
pub struct HardwareIdentityError(pub String);

impl From<HardwareIdentityError> for PipelineError {
    fn from(e: HardwareIdentityError) -> Self {
        PipelineError::AttestationUnavailable {
            message: Some(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Certificate capability unavailable: {0}")]
    Capability(String),
    #[error("Certificate request failed: {0}")]
    Fetch(String),
    #[error("Certificate document malformed: {0}")]
    Malformed(#[from] DocumentError),
}

impl From<CertificateError> for PipelineError {
    fn from(e: CertificateError) -> Self {
        match e {
            CertificateError::Capability(message) => PipelineError::CapabilityLoad {
                message: Some(message),
            },
            CertificateError::Fetch(message) => PipelineError::CertificateFetch {
                message: Some(message),
            },
            CertificateError::Malformed(e) => PipelineError::CertificateMalformed {
                message: Some(e.to_string()),
            },
        }
    }
}

/// Failure reported by the attestation primitive.
///
/// The pipeline decides which code it maps to from the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AttestationError(pub String);

impl From<nac::NacError> for AttestationError {
    fn from(e: nac::NacError) -> Self {
        AttestationError(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("Session capability unavailable: {0}")]
    Capability(String),
    #[error("Session request failed: {0}")]
    Transport(String),
    #[error("Session response malformed: {0}")]
    Malformed(DocumentError),
    #[error("Session rejected with status {status}")]
    Rejected { status: i64 },
    #[error("Session response has no `session-info`")]
    MissingSessionInfo,
}

impl From<NegotiationError> for PipelineError {
    fn from(e: NegotiationError) -> Self {
        let message = Some(e.to_string());
        match e {
            NegotiationError::Capability(_) => PipelineError::CapabilityLoad { message },
            NegotiationError::Transport(_) => PipelineError::SessionRequest { message },
            NegotiationError::Malformed(_) => PipelineError::SessionMalformed { message },
            NegotiationError::Rejected { .. } => PipelineError::SessionRejected { message },
            NegotiationError::MissingSessionInfo => PipelineError::SessionInfoMissing { message },
        }
    }
}

/// Structural problems in a property list document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("not a property list: {0}")]
    NotParseable(String),
    #[error("top-level value is not a dictionary")]
    NotADictionary,
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("field `{key}` is not {expected}")]
    WrongType { key: String, expected: &'static str },
    #[error("failed to serialize property list: {0}")]
    Serialize(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to build relay client")]
    Client(#[source] reqwest::Error),
    #[error("Relay request failed")]
    Request(#[from] reqwest::Error),
    #[error("Relay returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode relay response")]
    Decode(#[from] base64::DecodeError),
    #[error("Relay returned no validation data")]
    Empty,
    #[error("Invalid relay token")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}
