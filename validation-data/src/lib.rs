//! Validation data generation for device identity registration
//!
//! This crate produces the opaque validation data blob that proves a device's
//! authenticity to the identity registration service. It fetches the
//! validation certificate, drives an attestation session through init, key
//! establishment and signing, and performs the session-info handshake in
//! between. Every failure maps to one stable [`PipelineError`] code.

pub mod attestation;
pub mod certificate;
pub mod constants;
pub mod document;
pub mod errors;
pub mod hardware;
pub mod native;
pub mod pipeline;
pub mod relay;
pub mod session;
pub mod types;
pub mod utils;

pub use attestation::{AttestationContext, AttestationEngine, AttestationPrimitive};
pub use certificate::{CertificateFetcher, HttpCertificateFetcher};
pub use errors::{ErrorCategory, PipelineError, RelayError, Result};
pub use hardware::{HardwareIdentitySource, JsonFileIdentitySource, StaticIdentitySource};
pub use native::NativeAttestationEngine;
pub use pipeline::{
    generate_validation_data, PipelineOutcome, PipelineState, ValidationOptions,
    ValidationPipeline,
};
pub use relay::RelayClient;
pub use session::{HttpSessionNegotiator, SessionNegotiator};
pub use types::{HardwareIdentity, SessionInfo, ValidationCertificate, ValidationData};
