//! Base64 payload wrapping for embedded binary values.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::rfc::vcard::core::VCardVersion;

/// Column width of a wrapped 2.1 payload line.
pub const WRAP_WIDTH: usize = 72;

/// Decoder that accepts payloads with or without padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes `bytes` for `version`.
///
/// 2.1 starts the payload on its own line, indents every payload line by one
/// space, wraps at [`WRAP_WIDTH`] and ends with an empty line. 3.0 and 4.0
/// emit a single run that the line folder splits later.
#[must_use]
pub fn wrap(bytes: &[u8], version: VCardVersion) -> String {
    let encoded = STANDARD.encode(bytes);
    if !matches!(version, VCardVersion::V2_1) {
        return encoded;
    }

    let mut out = String::with_capacity(encoded.len() + encoded.len() / WRAP_WIDTH * 3 + 6);
    for chunk in encoded.as_bytes().chunks(WRAP_WIDTH) {
        out.push_str("\r\n ");
        out.extend(chunk.iter().map(|&b| char::from(b)));
    }
    out.push_str("\r\n");
    out
}

/// Decodes a payload, ignoring whitespace and line breaks anywhere in it.
///
/// ## Errors
/// Returns the decoder error for invalid Base64.
pub fn unwrap(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT.decode(compact)
}
