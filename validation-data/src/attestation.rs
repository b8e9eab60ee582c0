//! Capability interface over the attestation primitive.
//!
//! The primitive's three operations must run in a fixed order on one session:
//! `init`, `key_establishment`, `sign`. [`AttestationContext`] encodes that
//! order in its type parameter and consumes itself on every transition, so a
//! context can neither be used out of order nor twice.

use std::marker::PhantomData;

use crate::{
    errors::AttestationError,
    types::{HardwareIdentity, SessionInfo, ValidationCertificate, ValidationData},
};

/// Raw operations of one attestation session.
///
/// Implementations may assume the calls arrive in order and at most once each;
/// the ordering is enforced by [`AttestationContext`].
pub trait AttestationPrimitive {
    /// Binds the certificate and hardware identifiers into the session and
    /// returns the session-info request blob.
    fn init(
        &mut self,
        certificate: &[u8],
        identity: &HardwareIdentity,
    ) -> Result<Vec<u8>, AttestationError>;

    fn key_establishment(&mut self, session_info: &[u8]) -> Result<(), AttestationError>;

    fn sign(&mut self) -> Result<Vec<u8>, AttestationError>;
}

/// Provides fresh attestation sessions.
pub trait AttestationEngine: Send + Sync {
    /// Resolves the primitive and opens a new, uninitialized session.
    ///
    /// Fails when the primitive is not available on this host.
    fn load(&self) -> Result<Box<dyn AttestationPrimitive>, AttestationError>;
}

/// Marker: `init` succeeded.
#[derive(Debug)]
pub struct Initialized;

/// Marker: `key_establishment` succeeded.
#[derive(Debug)]
pub struct KeysEstablished;

/// An attestation session in state `S`.
pub struct AttestationContext<S> {
    primitive: Box<dyn AttestationPrimitive>,
    _state: PhantomData<S>,
}

impl AttestationContext<Initialized> {
    /// Initializes a fresh session, returning the context and the init blob.
    pub fn initialize(
        mut primitive: Box<dyn AttestationPrimitive>,
        certificate: &ValidationCertificate,
        identity: &HardwareIdentity,
    ) -> Result<(Self, Vec<u8>), AttestationError> {
        let init_blob = primitive.init(&certificate.certificate, identity)?;
        if init_blob.is_empty() {
            return Err(AttestationError(
                "initialization produced an empty session-info request".to_string(),
            ));
        }
        let context = AttestationContext {
            primitive,
            _state: PhantomData,
        };
        Ok((context, init_blob))
    }

    pub fn establish_keys(
        mut self,
        session: &SessionInfo,
    ) -> Result<AttestationContext<KeysEstablished>, AttestationError> {
        self.primitive.key_establishment(&session.session_info)?;
        Ok(AttestationContext {
            primitive: self.primitive,
            _state: PhantomData,
        })
    }
}

impl AttestationContext<KeysEstablished> {
    /// Signs and releases the session.
    pub fn sign(mut self) -> Result<ValidationData, AttestationError> {
        let data = self.primitive.sign()?;
        if data.is_empty() {
            return Err(AttestationError(
                "signing produced no validation data".to_string(),
            ));
        }
        Ok(ValidationData::new(data))
    }
}

impl<S> std::fmt::Debug for AttestationContext<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AttestationContext<{}>", std::any::type_name::<S>())
    }
}
