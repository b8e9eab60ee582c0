use std::path::{Path, PathBuf};

use tracing::{debug, error, instrument};

use crate::{errors::HardwareIdentityError, types::HardwareIdentity};

/// Supplies the device identifiers for one validation run.
///
/// Implementations read live state on every call. A source that can read some
/// identifiers but not others leaves the missing ones absent; a source that
/// cannot reach its backing store at all returns a single
/// [`HardwareIdentityError`].
pub trait HardwareIdentitySource: Send + Sync {
    fn read(&self) -> Result<HardwareIdentity, HardwareIdentityError>;
}

/// Source returning a fixed identity, for hosts whose identifiers were
/// collected ahead of time.
#[derive(Debug, Clone)]
pub struct StaticIdentitySource {
    identity: HardwareIdentity,
}

impl StaticIdentitySource {
    pub fn new(identity: HardwareIdentity) -> Self {
        Self { identity }
    }
}

impl HardwareIdentitySource for StaticIdentitySource {
    fn read(&self) -> Result<HardwareIdentity, HardwareIdentityError> {
        Ok(self.identity.clone())
    }
}

/// Source reading a JSON hardware key from disk on every call.
#[derive(Debug, Clone)]
pub struct JsonFileIdentitySource {
    path: PathBuf,
}

impl JsonFileIdentitySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HardwareIdentitySource for JsonFileIdentitySource {
    #[instrument(level = "debug", name = "read_hardware_identity", skip(self), fields(path = %self.path.display()))]
    fn read(&self) -> Result<HardwareIdentity, HardwareIdentityError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            error!(
                level = "hardware_identity",
                "Failed to read hardware identity file: {e}"
            );
            HardwareIdentityError(format!("{}: {e}", self.path.display()))
        })?;
        let identity: HardwareIdentity = serde_json::from_str(&contents).map_err(|e| {
            error!(
                level = "hardware_identity",
                "Failed to parse hardware identity file: {e}"
            );
            HardwareIdentityError(format!("{}: {e}", self.path.display()))
        })?;
        debug!(
            level = "hardware_identity",
            product_name = ?identity.product_name,
            os_build = ?identity.os_build,
            "Read hardware identity"
        );
        Ok(identity)
    }
}
