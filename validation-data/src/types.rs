use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use url::Url;

/// Snapshot of the device identifiers bound into an attestation context.
///
/// Every field is optional: a source that cannot read one identifier leaves it
/// absent instead of failing the whole read. The JSON form uses the snake_case
/// field names below and accepts the aliases used by hardware key exports
/// (`platform_serial_number`, `os_build_num`, `io_mac_address`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareIdentity {
    /// Model identifier, e.g. `Mac14,14`
    pub product_name: Option<String>,
    #[serde(alias = "platform_serial_number")]
    pub serial_number: Option<String>,
    pub platform_uuid: Option<String>,
    pub board_id: Option<String>,
    #[serde(alias = "os_build_num")]
    pub os_build: Option<String>,
    pub os_version: Option<String>,
    /// EFI ROM bytes
    pub rom: Option<Vec<u8>>,
    /// Main logic board serial
    pub mlb: Option<String>,
    #[serde(alias = "io_mac_address")]
    pub mac_address: Option<Vec<u8>>,
    pub root_disk_uuid: Option<String>,
}

impl HardwareIdentity {
    /// Lowercase hex rendering of the EFI ROM.
    pub fn rom_hex(&self) -> Option<String> {
        self.rom.as_ref().map(hex::encode)
    }

    /// Colon separated rendering of the MAC address.
    pub fn mac_address_string(&self) -> Option<String> {
        self.mac_address.as_ref().map(|mac| {
            mac.iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(":")
        })
    }

    /// Borrowed view in the form the native attestation library takes.
    pub fn as_nac_hardware_info(&self) -> nac::HardwareInfo<'_> {
        nac::HardwareInfo {
            product_name: self.product_name.as_deref(),
            serial_number: self.serial_number.as_deref(),
            platform_uuid: self.platform_uuid.as_deref(),
            board_id: self.board_id.as_deref(),
            os_build_num: self.os_build.as_deref(),
            os_version: self.os_version.as_deref(),
            rom: self.rom.as_deref(),
            mlb: self.mlb.as_deref(),
            mac_address: self.mac_address.as_deref(),
            root_disk_uuid: self.root_disk_uuid.as_deref(),
        }
    }
}

/// Parsed validation certificate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationCertificate {
    /// Certificate bytes handed to the attestation context on initialization
    pub certificate: Vec<u8>,
    /// Endpoint of the session-info handshake
    pub session_url: Url,
}

/// Accepted session negotiation response.
///
/// Only constructed once the status has been checked against the success
/// sentinel and the session-info payload has been found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub status: i64,
    pub session_info: Vec<u8>,
}

/// Signed validation data, opaque to this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidationData(Vec<u8>);

impl ValidationData {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Standard base64 encoding, the form relays and registration payloads use.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl AsRef<[u8]> for ValidationData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<ValidationData> for Vec<u8> {
    fn from(data: ValidationData) -> Self {
        data.0
    }
}

impl std::fmt::Debug for ValidationData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValidationData({} bytes)", self.0.len())
    }
}
