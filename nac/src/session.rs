use std::{ptr, sync::Arc};

use crate::{
    error::{check_rc, NacError, Result},
    functions::NacLibrary,
    types::{CHardwareInfo, HardwareInfo, NacContext},
};

/// One NAC validation context.
///
/// Created by `nac_init`, consumed by key establishment and signing, and
/// released with `nac_context_free` when dropped. Holds the library alive for
/// as long as the context exists.
pub struct NacSession {
    context: NacContext,
    library: Arc<NacLibrary>,
}

impl NacSession {
    /// Runs `nac_init` with the validation certificate and hardware identifiers.
    ///
    /// Returns the new session and the session-info request blob that has to be
    /// sent to the validation service.
    pub fn init(
        library: Arc<NacLibrary>,
        certificate: &[u8],
        hardware: &HardwareInfo<'_>,
    ) -> Result<(Self, Vec<u8>)> {
        let hardware = CHardwareInfo::new(hardware)?;
        let raw_hardware = hardware.as_raw();
        let mut context: NacContext = ptr::null_mut();
        let mut request: *mut u8 = ptr::null_mut();
        let mut request_len: usize = 0;

        let rc = unsafe {
            (library.init)(
                certificate.as_ptr(),
                certificate.len(),
                &raw_hardware,
                &mut context,
                &mut request,
                &mut request_len,
            )
        };
        // The session owns the context from here on, even if init failed after
        // allocating it.
        let session = NacSession { context, library };
        if let Err(e) = check_rc("nac_init", rc) {
            session.free_buffer(request);
            return Err(e);
        }
        if session.context.is_null() {
            session.free_buffer(request);
            return Err(NacError::EmptyOutput {
                operation: "nac_init",
            });
        }
        let request = session.take_buffer("nac_init", request, request_len)?;
        Ok((session, request))
    }

    /// Feeds the server's session-info into the context.
    pub fn key_establishment(&mut self, session_info: &[u8]) -> Result<()> {
        let rc = unsafe {
            (self.library.key_establishment)(
                self.context,
                session_info.as_ptr(),
                session_info.len(),
            )
        };
        check_rc("nac_key_establishment", rc)
    }

    /// Produces the signed validation data.
    pub fn sign(&mut self) -> Result<Vec<u8>> {
        let mut data: *mut u8 = ptr::null_mut();
        let mut data_len: usize = 0;
        let rc = unsafe { (self.library.sign)(self.context, &mut data, &mut data_len) };
        if let Err(e) = check_rc("nac_sign", rc) {
            self.free_buffer(data);
            return Err(e);
        }
        self.take_buffer("nac_sign", data, data_len)
    }

    /// Copies a library-owned buffer into a `Vec` and hands it back for release.
    fn take_buffer(&self, operation: &'static str, buf: *mut u8, len: usize) -> Result<Vec<u8>> {
        if buf.is_null() || len == 0 {
            self.free_buffer(buf);
            return Err(NacError::EmptyOutput { operation });
        }
        let data = unsafe { std::slice::from_raw_parts(buf, len) }.to_vec();
        self.free_buffer(buf);
        Ok(data)
    }

    fn free_buffer(&self, buf: *mut u8) {
        if !buf.is_null() {
            unsafe { (self.library.free_buffer)(buf) };
        }
    }
}

impl Drop for NacSession {
    fn drop(&mut self) {
        if !self.context.is_null() {
            unsafe { (self.library.context_free)(self.context) };
            self.context = ptr::null_mut();
        }
    }
}
