use std::{path::PathBuf, sync::Arc};

use nac::{NacLibrary, NacSession};
use once_cell::sync::OnceCell;
use tracing::{error, instrument};

use crate::{
    attestation::{AttestationEngine, AttestationPrimitive},
    errors::AttestationError,
    types::HardwareIdentity,
};

/// Attestation engine backed by the native NAC library.
///
/// The library is opened on the first successful `load` and kept for the
/// lifetime of the engine; every run still gets its own session.
#[derive(Debug, Default)]
pub struct NativeAttestationEngine {
    library_path: Option<PathBuf>,
    library: OnceCell<Arc<NacLibrary>>,
}

impl NativeAttestationEngine {
    /// `library_path == None` searches `NAC_LIBRARY_PATH` and the loader paths.
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self {
            library_path,
            library: OnceCell::new(),
        }
    }
}

impl AttestationEngine for NativeAttestationEngine {
    #[instrument(level = "debug", name = "load_attestation_engine", skip(self))]
    fn load(&self) -> Result<Box<dyn AttestationPrimitive>, AttestationError> {
        let library = self
            .library
            .get_or_try_init(|| NacLibrary::open(self.library_path.as_deref()).map(Arc::new))
            .map_err(|e| {
                error!(level = "attestation", "Failed to load NAC library: {e}");
                AttestationError::from(e)
            })?;
        Ok(Box::new(NativePrimitive {
            library: Arc::clone(library),
            session: None,
        }))
    }
}

/// One native session; the NAC context only exists once `init` ran.
struct NativePrimitive {
    library: Arc<NacLibrary>,
    session: Option<NacSession>,
}

impl NativePrimitive {
    fn session(&mut self) -> Result<&mut NacSession, AttestationError> {
        self.session
            .as_mut()
            .ok_or_else(|| AttestationError("NAC session is not initialized".to_string()))
    }
}

impl AttestationPrimitive for NativePrimitive {
    fn init(
        &mut self,
        certificate: &[u8],
        identity: &HardwareIdentity,
    ) -> Result<Vec<u8>, AttestationError> {
        let hardware = identity.as_nac_hardware_info();
        let (session, request) =
            NacSession::init(Arc::clone(&self.library), certificate, &hardware)?;
        self.session = Some(session);
        Ok(request)
    }

    fn key_establishment(&mut self, session_info: &[u8]) -> Result<(), AttestationError> {
        Ok(self.session()?.key_establishment(session_info)?)
    }

    fn sign(&mut self) -> Result<Vec<u8>, AttestationError> {
        Ok(self.session()?.sign()?)
    }
}
