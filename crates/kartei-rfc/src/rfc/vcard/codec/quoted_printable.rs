//! Quoted-printable transport encoding (2.1 and legacy 3.0 text).
//!
//! Text is converted to the declared charset before encoding and back after
//! decoding. A missing or unknown charset is treated as UTF-8.

use encoding_rs::{Encoding, UTF_8};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Soft line break inserted by [`encode`].
pub const SOFT_BREAK: &str = "=\r\n";

/// Resolves a `CHARSET` label.
#[must_use]
pub fn charset_encoding(charset: Option<&str>) -> &'static Encoding {
    charset
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Encodes `text` with soft line breaks.
///
/// `start_column` is the number of octets already on the first physical line
/// (the property header). Every produced line, counting the trailing `=` of a
/// soft break, fits in `budget` octets. CR and LF are encoded as `=0D` and
/// `=0A`, so the output contains no hard line breaks.
#[must_use]
pub fn encode(text: &str, charset: Option<&str>, start_column: usize, budget: usize) -> String {
    let (bytes, _, _) = charset_encoding(charset).encode(text);
    let limit = budget.saturating_sub(1).max(3);

    let mut out = String::with_capacity(bytes.len() * 3);
    let mut column = start_column;
    let mut token = [0u8; 3];

    for (i, &b) in bytes.iter().enumerate() {
        let is_last = i + 1 == bytes.len();
        let literal = match b {
            b'=' => false,
            b' ' | b'\t' => !is_last,
            33..=126 => true,
            _ => false,
        };

        let len = if literal {
            token[0] = b;
            1
        } else {
            token[0] = b'=';
            token[1] = HEX_UPPER[usize::from(b >> 4)];
            token[2] = HEX_UPPER[usize::from(b & 0x0F)];
            3
        };

        if column > 0 && column + len > limit {
            out.push_str(SOFT_BREAK);
            column = 0;
        }
        for &t in &token[..len] {
            out.push(char::from(t));
        }
        column += len;
    }

    out
}

/// Decodes quoted-printable text.
///
/// Soft line breaks (`=` followed by optional blanks and CRLF or LF) are
/// absorbed, hex digits are accepted in either case and an `=` that starts no
/// valid escape is kept literally.
#[must_use]
pub fn decode(input: &str, charset: Option<&str>) -> String {
    let src = input.as_bytes();
    let mut bytes = Vec::with_capacity(src.len());
    let mut pos = 0;

    while pos < src.len() {
        let b = src[pos];
        if b != b'=' {
            bytes.push(b);
            pos += 1;
            continue;
        }

        if let Some(value) = hex_pair(src.get(pos + 1).copied(), src.get(pos + 2).copied()) {
            bytes.push(value);
            pos += 3;
            continue;
        }

        let mut after = pos + 1;
        while matches!(src.get(after), Some(b' ' | b'\t')) {
            after += 1;
        }
        match (src.get(after), src.get(after + 1)) {
            (Some(b'\r'), Some(b'\n')) => pos = after + 2,
            (Some(b'\n'), _) => pos = after + 1,
            (None, _) => pos = after,
            _ => {
                bytes.push(b);
                pos += 1;
            }
        }
    }

    let (text, _) = charset_encoding(charset).decode_without_bom_handling(&bytes);
    text.into_owned()
}

/// Returns whether `text` needs quoted-printable to be carried by 2.1.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    text.bytes()
        .any(|b| !(b == b' ' || b == b'\t' || (33..=126).contains(&b)))
}

fn hex_pair(high: Option<u8>, low: Option<u8>) -> Option<u8> {
    let high = char::from(high?).to_digit(16)?;
    let low = char::from(low?).to_digit(16)?;
    u8::try_from(high << 4 | low).ok()
}
