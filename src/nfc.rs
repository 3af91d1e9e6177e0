//! NFC tag to device lookup.
//!
//! Tags carry a single NDEF text record whose text is the device identifier.
//! The browser reads the tag and posts the raw record payload; decoding and
//! the backend lookup happen here.
//!
//! Text record payload layout:
//!
//! ```text
//! byte 0      status: bit 7 = UTF-16, bits 0..=5 = language code length
//! 1..=n       IANA language code (ASCII)
//! n+1..       text, UTF-8 or UTF-16 (BOM honoured, big-endian otherwise)
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;

use crate::backend::{BackendClient, BackendError, Device, ResourceKind};

const UTF16_FLAG: u8 = 0x80;
const LANG_LEN_MASK: u8 = 0x3f;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NfcError {
    #[error("NFC scanning is not supported on this device")]
    Unsupported,

    #[error("tag does not hold a text record (found {0:?})")]
    NotText(String),

    #[error("tag payload is not valid base64")]
    Base64,

    #[error("tag payload is empty")]
    Empty,

    #[error("tag payload is shorter than its language code")]
    Truncated,

    #[error("tag text is not valid {0}")]
    Encoding(&'static str),

    #[error("tag does not carry a device identifier")]
    NoIdentifier,
}

/// A scanned record as posted by the browser.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannedRecord {
    /// `"text"` (Web NFC) or `"T"` (raw NDEF type).
    pub record_type: String,
    /// Base64 of the record payload.
    pub payload: String,
}

/// Whether this installation can scan tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcCapability {
    Available,
    Unavailable,
}

impl NfcCapability {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

impl ScannedRecord {
    /// Device identifier carried by this record.
    pub fn device_id(&self) -> Result<String, NfcError> {
        if !matches!(self.record_type.as_str(), "text" | "T") {
            return Err(NfcError::NotText(self.record_type.clone()));
        }
        let payload = STANDARD
            .decode(self.payload.trim())
            .map_err(|_| NfcError::Base64)?;
        let text = decode_text_record(&payload)?;
        let id = text.trim();
        if id.is_empty() {
            return Err(NfcError::NoIdentifier);
        }
        Ok(id.to_string())
    }
}

/// Decode the text of an NDEF text record payload.
pub fn decode_text_record(payload: &[u8]) -> Result<String, NfcError> {
    let (&status, rest) = payload.split_first().ok_or(NfcError::Empty)?;
    let lang_len = usize::from(status & LANG_LEN_MASK);
    let text = rest.get(lang_len..).ok_or(NfcError::Truncated)?;

    if status & UTF16_FLAG == 0 {
        String::from_utf8(text.to_vec()).map_err(|_| NfcError::Encoding("UTF-8"))
    } else {
        decode_utf16(text)
    }
}

fn decode_utf16(bytes: &[u8]) -> Result<String, NfcError> {
    if bytes.len() % 2 != 0 {
        return Err(NfcError::Encoding("UTF-16"));
    }
    let (little_endian, body) = match bytes {
        [0xff, 0xfe, body @ ..] => (true, body),
        [0xfe, 0xff, body @ ..] => (false, body),
        body => (false, body),
    };
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|_| NfcError::Encoding("UTF-16"))
}

/// Failure of a full scan-to-device lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    Tag(#[from] NfcError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Decode a scanned record and resolve it to a device.
pub async fn lookup_device(
    backend: &BackendClient,
    access_token: &str,
    tenant: &str,
    record: &ScannedRecord,
) -> Result<Device, LookupError> {
    let device_id = record.device_id()?;
    tracing::debug!(name: "nfc.lookup", %device_id, %tenant, "Resolving scanned tag");
    Ok(backend
        .resources()
        .get(access_token, tenant, ResourceKind::Devices, &device_id)
        .await?)
}
