use std::time::Duration;

use tracing::{error, info, instrument};
use url::Url;

use crate::{
    constants::{CERT_KEY, INITIALIZE_VALIDATION_URL_DOC_KEY},
    document::StructuredDocument,
    errors::{CertificateError, DocumentError},
    pipeline::ValidationOptions,
    types::ValidationCertificate,
    utils::{get_initialize_validation_url, get_validation_cert_url, http_client},
};

/// Retrieves and parses the validation certificate document.
pub trait CertificateFetcher: Send + Sync {
    fn fetch(&self) -> Result<ValidationCertificate, CertificateError>;
}

/// Fetches the certificate document over HTTP.
#[derive(Debug, Default, Clone)]
pub struct HttpCertificateFetcher {
    certificate_url: Option<String>,
    session_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpCertificateFetcher {
    pub fn new(options: &ValidationOptions) -> Self {
        Self {
            certificate_url: options.certificate_url.clone(),
            session_url: options.session_url.clone(),
            timeout: options.timeout,
        }
    }
}

impl CertificateFetcher for HttpCertificateFetcher {
    /// Fetches the certificate document and validates its structure.
    ///
    /// # Errors
    ///
    /// * `CertificateError::Capability` if a configured URL is invalid or the
    ///   HTTP client cannot be created
    /// * `CertificateError::Fetch` if the request fails or the server answers
    ///   with a non-success status
    /// * `CertificateError::Malformed` if the body is not a valid certificate
    ///   document
    #[instrument(level = "info", name = "fetch_validation_certificate", skip(self))]
    fn fetch(&self) -> Result<ValidationCertificate, CertificateError> {
        let certificate_url = get_validation_cert_url(self.certificate_url.as_deref());
        let certificate_url = Url::parse(&certificate_url).map_err(|e| {
            CertificateError::Capability(format!("invalid certificate URL `{certificate_url}`: {e}"))
        })?;
        let default_session_url = get_initialize_validation_url(self.session_url.as_deref());
        let default_session_url = Url::parse(&default_session_url).map_err(|e| {
            CertificateError::Capability(format!(
                "invalid session URL `{default_session_url}`: {e}"
            ))
        })?;
        let client = http_client(self.timeout)
            .map_err(|e| CertificateError::Capability(format!("failed to build HTTP client: {e}")))?;

        let response = client.get(certificate_url.clone()).send().map_err(|e| {
            error!(
                level = "certificate",
                url = %certificate_url,
                "Failed to send certificate request: {e}"
            );
            CertificateError::Fetch(e.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(
                level = "certificate",
                url = %certificate_url,
                "Certificate request failed with status code {status}"
            );
            return Err(CertificateError::Fetch(format!("HTTP {status}: {body}")));
        }
        let body = response
            .bytes()
            .map_err(|e| CertificateError::Fetch(format!("failed to read body: {e}")))?;

        let certificate = parse_certificate_document(&body, default_session_url).map_err(|e| {
            error!(level = "certificate", "Invalid certificate document: {e}");
            e
        })?;
        info!(
            level = "certificate",
            certificate_len = certificate.certificate.len(),
            session_url = %certificate.session_url,
            "Fetched validation certificate"
        );
        Ok(certificate)
    }
}

/// Parses a certificate document.
///
/// `cert` must be present as data. The session endpoint is taken from
/// `initialize-validation-url` when the document carries one, otherwise
/// `default_session_url` is used.
pub fn parse_certificate_document(
    bytes: &[u8],
    default_session_url: Url,
) -> Result<ValidationCertificate, CertificateError> {
    let document = StructuredDocument::parse(bytes)?;
    let certificate = document.required_data(CERT_KEY)?;
    if certificate.is_empty() {
        return Err(DocumentError::WrongType {
            key: CERT_KEY.to_string(),
            expected: "non-empty data",
        }
        .into());
    }
    let session_url = match document.optional_string(INITIALIZE_VALIDATION_URL_DOC_KEY)? {
        Some(url) => Url::parse(url).map_err(|_| DocumentError::WrongType {
            key: INITIALIZE_VALIDATION_URL_DOC_KEY.to_string(),
            expected: "a URL",
        })?,
        None => default_session_url,
    };
    Ok(ValidationCertificate {
        certificate: certificate.to_vec(),
        session_url,
    })
}
