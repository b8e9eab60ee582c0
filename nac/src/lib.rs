//! Binding to the native NAC attestation library
//!
//! The library is opened at runtime with `libloading`, so binaries built
//! against this crate start (and report a proper error) on machines where the
//! library is missing.

pub mod error;
pub mod functions;
mod session;
pub mod types;

pub use error::{NacError, Result};
pub use functions::{find_library, NacLibrary};
pub use session::NacSession;
pub use types::{HardwareInfo, NacRc};
