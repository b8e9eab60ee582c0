use std::{path::PathBuf, time::Duration};

use tracing::{debug, error, info, instrument};

use crate::{
    attestation::{AttestationContext, AttestationEngine},
    certificate::{CertificateFetcher, HttpCertificateFetcher},
    errors::{PipelineError, Result},
    hardware::HardwareIdentitySource,
    native::NativeAttestationEngine,
    session::{HttpSessionNegotiator, SessionNegotiator},
    types::ValidationData,
};

/// Options for validation data generation
#[derive(Debug, Default, Clone)]
pub struct ValidationOptions {
    /// Optional URL of the certificate document. If `None`, uses
    /// `NAC_VALIDATION_CERT_URL` or the default URL
    pub certificate_url: Option<String>,
    /// Optional session endpoint used when the certificate names none. If
    /// `None`, uses `NAC_INITIALIZE_VALIDATION_URL` or the default URL
    pub session_url: Option<String>,
    /// Optional path to the native NAC library. If `None`, the library is searched for
    pub library_path: Option<PathBuf>,
    /// Optional per-request timeout. If `None`, requests are not bounded
    pub timeout: Option<Duration>,
}

/// Progress of one run.
///
/// States only move forward; `Failed` is reachable from every state before
/// `Signed` and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    CertificateFetched,
    ContextInitialized,
    SessionNegotiated,
    KeysEstablished,
    Signed,
    Failed { code: i32 },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Signed | Self::Failed { .. })
    }
}

/// Result of a run together with the state it ended in.
#[derive(Debug)]
pub struct PipelineOutcome {
    state: PipelineState,
    result: Result<ValidationData>,
}

impl PipelineOutcome {
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn into_result(self) -> Result<ValidationData> {
        self.result
    }
}

/// Tracks the state of a single run.
struct Run {
    state: PipelineState,
}

impl Run {
    fn advance(&mut self, next: PipelineState) {
        debug!(level = "pipeline", from = ?self.state, to = ?next, "State transition");
        self.state = next;
    }

    fn fail(&mut self, e: PipelineError) -> PipelineError {
        error!(
            level = "pipeline",
            state = ?self.state,
            code = e.code(),
            "Validation data generation failed: {e}"
        );
        self.state = PipelineState::Failed { code: e.code() };
        e
    }
}

/// Sequences identity, certificate, attestation and session negotiation into
/// one validation data run.
///
/// The pipeline holds no per-run state: every call reads the identity, fetches
/// the certificate and opens an attestation session afresh, so one pipeline
/// may serve concurrent runs from several threads.
pub struct ValidationPipeline {
    identity_source: Box<dyn HardwareIdentitySource>,
    fetcher: Box<dyn CertificateFetcher>,
    engine: Box<dyn AttestationEngine>,
    negotiator: Box<dyn SessionNegotiator>,
}

impl ValidationPipeline {
    pub fn new(
        identity_source: impl HardwareIdentitySource + 'static,
        fetcher: impl CertificateFetcher + 'static,
        engine: impl AttestationEngine + 'static,
        negotiator: impl SessionNegotiator + 'static,
    ) -> Self {
        Self {
            identity_source: Box::new(identity_source),
            fetcher: Box::new(fetcher),
            engine: Box::new(engine),
            negotiator: Box::new(negotiator),
        }
    }

    /// Pipeline talking HTTP to the validation service and using the native
    /// NAC library.
    pub fn with_options(
        identity_source: impl HardwareIdentitySource + 'static,
        options: &ValidationOptions,
    ) -> Self {
        Self::new(
            identity_source,
            HttpCertificateFetcher::new(options),
            NativeAttestationEngine::new(options.library_path.clone()),
            HttpSessionNegotiator::new(options),
        )
    }

    /// Produces validation data, or the error of the first stage that failed.
    pub fn generate_validation_data(&self) -> Result<ValidationData> {
        self.run().into_result()
    }

    /// Runs every stage in order, stopping at the first failure.
    ///
    /// 1. Reads the hardware identity
    /// 2. Fetches the validation certificate
    /// 3. Opens an attestation session and initializes it
    /// 4. Negotiates session-info with the service
    /// 5. Performs key establishment
    /// 6. Signs
    #[instrument(level = "info", name = "validation_pipeline", skip_all)]
    pub fn run(&self) -> PipelineOutcome {
        let mut run = Run {
            state: PipelineState::Start,
        };
        let result = self.execute(&mut run);
        PipelineOutcome {
            state: run.state,
            result,
        }
    }

    fn execute(&self, run: &mut Run) -> Result<ValidationData> {
        let identity = self
            .identity_source
            .read()
            .map_err(|e| run.fail(e.into()))?;

        let certificate = self.fetcher.fetch().map_err(|e| run.fail(e.into()))?;
        run.advance(PipelineState::CertificateFetched);

        let primitive = self.engine.load().map_err(|e| {
            run.fail(PipelineError::AttestationUnavailable {
                message: Some(e.to_string()),
            })
        })?;
        let (context, init_blob) = AttestationContext::initialize(primitive, &certificate, &identity)
            .map_err(|e| {
                run.fail(PipelineError::ContextInit {
                    message: Some(e.to_string()),
                })
            })?;
        run.advance(PipelineState::ContextInitialized);

        let session = self
            .negotiator
            .negotiate(&certificate, &identity, &init_blob)
            .map_err(|e| run.fail(e.into()))?;
        run.advance(PipelineState::SessionNegotiated);

        let context = context.establish_keys(&session).map_err(|e| {
            run.fail(PipelineError::KeyEstablishment {
                message: Some(e.to_string()),
            })
        })?;
        run.advance(PipelineState::KeysEstablished);

        let data = context.sign().map_err(|e| {
            run.fail(PipelineError::Sign {
                message: Some(e.to_string()),
            })
        })?;
        run.advance(PipelineState::Signed);

        info!(
            level = "pipeline",
            validation_data_len = data.len(),
            "Generated validation data"
        );
        Ok(data)
    }
}

/// Generates validation data with the HTTP collaborators and the native NAC
/// library.
///
/// # Example
///
/// ```rust,ignore
/// use validation_data::{generate_validation_data, JsonFileIdentitySource, ValidationOptions};
///
/// let source = JsonFileIdentitySource::new("hardware.json");
/// match generate_validation_data(source, &ValidationOptions::default()) {
///     Ok(data) => println!("{}", data.to_base64()),
///     Err(e) => eprintln!("error {}: {e}", e.code()),
/// }
/// ```
pub fn generate_validation_data(
    identity_source: impl HardwareIdentitySource + 'static,
    options: &ValidationOptions,
) -> Result<ValidationData> {
    ValidationPipeline::with_options(identity_source, options).generate_validation_data()
}
