use std::ffi::{c_char, c_void, CString};
use std::ptr;

use crate::error::Result;

/// Return code from the NAC API, `0` on success
pub type NacRc = i32;

/// Opaque validation context handle
pub type NacContext = *mut c_void;

/// `nac_init(cert, cert_len, hw, out_ctx, out_request, out_request_len)`
pub type NacInitFn = unsafe extern "C" fn(
    *const u8,
    usize,
    *const NacHardwareInfo,
    *mut NacContext,
    *mut *mut u8,
    *mut usize,
) -> NacRc;

/// `nac_key_establishment(ctx, session_info, session_info_len)`
pub type NacKeyEstablishmentFn = unsafe extern "C" fn(NacContext, *const u8, usize) -> NacRc;

/// `nac_sign(ctx, out_data, out_data_len)`
pub type NacSignFn = unsafe extern "C" fn(NacContext, *mut *mut u8, *mut usize) -> NacRc;

/// `nac_free_buffer(buf)`, releases buffers handed out by the library
pub type NacFreeBufferFn = unsafe extern "C" fn(*mut u8);

/// `nac_context_free(ctx)`
pub type NacContextFreeFn = unsafe extern "C" fn(NacContext);

/// Hardware identifiers in the layout expected by `nac_init`.
///
/// Absent strings are passed as null pointers, absent byte fields as a null
/// pointer with a zero length.
#[derive(Debug)]
#[repr(C)]
pub struct NacHardwareInfo {
    pub product_name: *const c_char,
    pub serial_number: *const c_char,
    pub platform_uuid: *const c_char,
    pub board_id: *const c_char,
    pub os_build_num: *const c_char,
    pub os_version: *const c_char,
    pub rom: *const u8,
    pub rom_len: usize,
    pub mlb: *const c_char,
    pub mac_address: *const u8,
    pub mac_address_len: usize,
    pub root_disk_uuid: *const c_char,
}

/// Borrowed view of the device identifiers bound into a new context.
#[derive(Debug, Default, Clone, Copy)]
pub struct HardwareInfo<'a> {
    pub product_name: Option<&'a str>,
    pub serial_number: Option<&'a str>,
    pub platform_uuid: Option<&'a str>,
    pub board_id: Option<&'a str>,
    pub os_build_num: Option<&'a str>,
    pub os_version: Option<&'a str>,
    pub rom: Option<&'a [u8]>,
    pub mlb: Option<&'a str>,
    pub mac_address: Option<&'a [u8]>,
    pub root_disk_uuid: Option<&'a str>,
}

/// Owns the C strings backing a [`NacHardwareInfo`].
///
/// The raw struct returned by [`CHardwareInfo::as_raw`] borrows from `self`
/// and must not outlive it.
pub(crate) struct CHardwareInfo<'a> {
    strings: [Option<CString>; 8],
    rom: Option<&'a [u8]>,
    mac_address: Option<&'a [u8]>,
}

impl<'a> CHardwareInfo<'a> {
    pub(crate) fn new(info: &HardwareInfo<'a>) -> Result<Self> {
        let to_c = |value: Option<&str>| value.map(CString::new).transpose();
        Ok(Self {
            strings: [
                to_c(info.product_name)?,
                to_c(info.serial_number)?,
                to_c(info.platform_uuid)?,
                to_c(info.board_id)?,
                to_c(info.os_build_num)?,
                to_c(info.os_version)?,
                to_c(info.mlb)?,
                to_c(info.root_disk_uuid)?,
            ],
            rom: info.rom,
            mac_address: info.mac_address,
        })
    }

    pub(crate) fn as_raw(&self) -> NacHardwareInfo {
        let c = |index: usize| {
            self.strings[index]
                .as_ref()
                .map_or(ptr::null(), |s| s.as_ptr())
        };
        let bytes = |value: Option<&[u8]>| {
            value.map_or((ptr::null(), 0), |b| (b.as_ptr(), b.len()))
        };
        let (rom, rom_len) = bytes(self.rom);
        let (mac_address, mac_address_len) = bytes(self.mac_address);
        NacHardwareInfo {
            product_name: c(0),
            serial_number: c(1),
            platform_uuid: c(2),
            board_id: c(3),
            os_build_num: c(4),
            os_version: c(5),
            rom,
            rom_len,
            mlb: c(6),
            mac_address,
            mac_address_len,
            root_disk_uuid: c(7),
        }
    }
}
