use thiserror::Error;

use crate::types::NacRc;

pub type Result<T> = std::result::Result<T, NacError>;

#[derive(Debug, Error)]
pub enum NacError {
    #[error("Failed to load NAC library `{path}`: {message}")]
    LibraryLoad { path: String, message: String },
    #[error("Symbol `{symbol}` not found in NAC library: {message}")]
    SymbolNotFound {
        symbol: &'static str,
        message: String,
    },
    #[error("{operation} failed with NAC return code {rc}")]
    Rc { operation: &'static str, rc: NacRc },
    #[error("{operation} returned no data")]
    EmptyOutput { operation: &'static str },
    #[error("Hardware identifier contains an interior NUL byte")]
    NulError(#[from] std::ffi::NulError),
}

/// Maps a NAC return code to `Ok(())` or an error naming the failed call.
#[inline(always)]
pub(crate) fn check_rc(operation: &'static str, rc: NacRc) -> Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        tracing::error!(level = "nac", operation, rc, "NAC call failed");
        Err(NacError::Rc { operation, rc })
    }
}
