//! `data:` URLs for embedded 4.0 binary values (RFC 2397).

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use super::base64::{unwrap, wrap};
use crate::rfc::vcard::core::VCardVersion;

/// Media type assumed for a base64 payload without one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Characters escaped in the text form.
const DATA_TEXT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b',')
    .add(b';');

/// Payload of a parsed `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataUrl {
    Binary {
        media_type: Option<String>,
        data: Vec<u8>,
    },
    Text(String),
}

/// Formats `data:<media type>;base64,<payload>`.
#[must_use]
pub fn format_base64(media_type: Option<&str>, bytes: &[u8]) -> String {
    let media_type = media_type
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MEDIA_TYPE);
    format!("data:{media_type};base64,{}", wrap(bytes, VCardVersion::V4_0))
}

/// Formats `data:,<percent-encoded text>`.
#[must_use]
pub fn format_text(text: &str) -> String {
    format!("data:,{}", utf8_percent_encode(text, DATA_TEXT))
}

/// Parses a `data:` URL; `None` if `url` is not one or its payload is invalid.
#[must_use]
pub fn parse(url: &str) -> Option<DataUrl> {
    let rest = url
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &url[5..])?;
    let (header, payload) = rest.split_once(',')?;

    let (media_type, is_base64) = match header.rsplit_once(';') {
        Some((media, token)) if token.eq_ignore_ascii_case("base64") => (media, true),
        _ => (header, false),
    };
    let media_type = media_type.trim();

    if is_base64 {
        let data = unwrap(payload).ok()?;
        return Some(DataUrl::Binary {
            media_type: (!media_type.is_empty()).then(|| media_type.to_string()),
            data,
        });
    }

    let decoded = percent_decode_str(payload);
    if media_type.is_empty() || media_type.to_ascii_lowercase().starts_with("text/") {
        Some(DataUrl::Text(decoded.decode_utf8_lossy().into_owned()))
    } else {
        Some(DataUrl::Binary {
            media_type: Some(media_type.to_string()),
            data: decoded.collect(),
        })
    }
}
