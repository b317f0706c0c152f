//! Version-gated backslash escaping of values and parameter values.
//!
//! 2.1 defines no escaping grammar, so masking is the identity there. 3.0 and
//! 4.0 escape `\`, `,`, `;` and line breaks. Unmasking is lenient: an escape
//! followed by an unknown character yields that character.

use std::borrow::Cow;

use crate::rfc::vcard::core::VCardVersion;

const ESCAPE: char = '\\';

/// Escapes a text value for `version`.
///
/// Line breaks (`\r\n`, `\n`, lone `\r`) are written as the two characters
/// `\n`.
#[must_use]
pub fn mask(value: &str, version: VCardVersion) -> Cow<'_, str> {
    if !version.has_escaping() || !value.contains(['\\', ',', ';', '\n', '\r']) {
        return Cow::Borrowed(value);
    }

    let mut result = String::with_capacity(value.len() + value.len() / 8 + 2);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push_str("\\n");
            }
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Reverses [`mask`] for `version`.
#[must_use]
pub fn unmask(value: &str, version: VCardVersion) -> Cow<'_, str> {
    if !version.has_escaping() || !value.contains(ESCAPE) {
        return Cow::Borrowed(value);
    }

    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(next) => result.push(next),
            None => result.push(ESCAPE),
        }
    }
    Cow::Owned(result)
}

/// Escapes line breaks in a parameter value (3.0/4.0).
#[must_use]
pub fn mask_parameter_value(value: &str, version: VCardVersion) -> Cow<'_, str> {
    if !version.has_escaping() || !value.contains(['\n', '\r']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.replace("\r\n", "\\n").replace(['\r', '\n'], "\\n"))
}

/// Resolves escapes in a parameter value.
///
/// 3.0 and 4.0 accept `\n`; 4.0 additionally accepts the RFC 6868 caret
/// escapes `^n`, `^'` and `^^`. Other sequences pass through unchanged.
#[must_use]
pub fn unmask_parameter_value(value: &str, version: VCardVersion) -> Cow<'_, str> {
    let caret = matches!(version, VCardVersion::V4_0);
    if !version.has_escaping() || !(value.contains(ESCAPE) || (caret && value.contains('^'))) {
        return Cow::Borrowed(value);
    }

    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('\\', Some('n' | 'N')) => {
                chars.next();
                result.push('\n');
            }
            ('^', Some('n')) if caret => {
                chars.next();
                result.push('\n');
            }
            ('^', Some('\'')) if caret => {
                chars.next();
                result.push('"');
            }
            ('^', Some('^')) if caret => {
                chars.next();
                result.push('^');
            }
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Returns whether the byte at `index` is preceded by an odd number of
/// backslashes.
#[must_use]
pub fn is_escaped(bytes: &[u8], index: usize) -> bool {
    bytes[..index.min(bytes.len())]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// Returns the byte offset of the first unescaped ASCII `separator`.
#[must_use]
pub fn find_unescaped(value: &str, separator: u8) -> Option<usize> {
    let bytes = value.as_bytes();
    bytes
        .iter()
        .enumerate()
        .find(|&(i, &b)| b == separator && !is_escaped(bytes, i))
        .map(|(i, _)| i)
}

/// Splits on unescaped ASCII `separator`; the pieces keep their escapes.
#[must_use]
pub fn split_unescaped(value: &str, separator: u8) -> Vec<&str> {
    let bytes = value.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == separator {
            parts.push(&value[start..i]);
            start = i + 1;
        } else {
            // ordinary byte
        }
    }

    parts.push(&value[start..]);
    parts
}

/// Unmasks one component of a structured value.
///
/// In 2.1 only `\;` is resolved, the escape property-specific splitters use
/// for semicolons inside components.
#[must_use]
pub fn unmask_component(value: &str, version: VCardVersion) -> Cow<'_, str> {
    if version.has_escaping() {
        unmask(value, version)
    } else if value.contains("\\;") {
        Cow::Owned(value.replace("\\;", ";"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Masks list items and joins them with commas.
#[must_use]
pub fn join_list(items: &[String], version: VCardVersion) -> String {
    items
        .iter()
        .map(|item| mask(item, version))
        .collect::<Vec<_>>()
        .join(",")
}

/// Masks the components of a structured value and joins them.
///
/// Components are separated by `;`, the items of one component by `,`. 2.1
/// has no item separator, so its items are joined with a space and read back
/// as one item; semicolons inside an item are written as `\;`.
#[must_use]
pub fn join_structured(components: &[Vec<String>], version: VCardVersion) -> String {
    components
        .iter()
        .map(|items| {
            if version.has_escaping() {
                join_list(items, version)
            } else {
                items
                    .iter()
                    .map(|item| item.replace(';', "\\;"))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_is_identity_in_2_1() {
        assert_eq!(mask("a,b;c\\d", VCardVersion::V2_1), "a,b;c\\d");
        assert_eq!(unmask("a\\,b", VCardVersion::V2_1), "a\\,b");
    }

    #[test]
    fn mask_reserved_characters() {
        assert_eq!(
            mask("Bodo, der Blöde", VCardVersion::V3_0),
            "Bodo\\, der Blöde"
        );
        assert_eq!(mask("a;b\\c", VCardVersion::V4_0), "a\\;b\\\\c");
        assert_eq!(mask("line1\r\nline2\nline3", VCardVersion::V4_0), "line1\\nline2\\nline3");
    }

    #[test]
    fn unmask_inverse() {
        let value = "x\\y, z; w\nv";
        for version in [VCardVersion::V3_0, VCardVersion::V4_0] {
            assert_eq!(unmask(&mask(value, version), version), value);
        }
    }

    #[test]
    fn unmask_is_lenient() {
        assert_eq!(unmask("a\\qb", VCardVersion::V3_0), "aqb");
        assert_eq!(unmask("trailing\\", VCardVersion::V3_0), "trailing\\");
        assert_eq!(unmask("\\N", VCardVersion::V4_0), "\n");
    }

    #[test]
    fn split_respects_escapes() {
        assert_eq!(split_unescaped("a,b\\,c,d", b','), vec!["a", "b\\,c", "d"]);
        assert_eq!(split_unescaped("a\\\\,b", b','), vec!["a\\\\", "b"]);
        assert_eq!(split_unescaped("", b';'), vec![""]);
    }

    #[test]
    fn escape_lookback() {
        let bytes = b"a\\\\.b\\.c";
        assert!(!is_escaped(bytes, 3));
        assert!(is_escaped(bytes, 6));
        assert_eq!(find_unescaped("x\\.y.z", b'.'), Some(4));
    }

    #[test]
    fn parameter_value_escapes() {
        assert_eq!(
            mask_parameter_value("123 Main St\nAnytown", VCardVersion::V4_0),
            "123 Main St\\nAnytown"
        );
        assert_eq!(
            unmask_parameter_value("^'quoted^' ^^ a^nb", VCardVersion::V4_0),
            "\"quoted\" ^ a\nb"
        );
        assert_eq!(
            unmask_parameter_value("^'x^'", VCardVersion::V3_0),
            "^'x^'"
        );
    }

    #[test]
    fn structured_join() {
        let components = vec![
            vec!["Doe".to_string()],
            vec!["John".to_string(), "J.".to_string()],
            vec![],
            vec!["Dr.; PhD".to_string()],
        ];
        assert_eq!(
            join_structured(&components, VCardVersion::V3_0),
            "Doe;John,J.;;Dr.\\; PhD"
        );
        assert_eq!(
            join_structured(&components, VCardVersion::V2_1),
            "Doe;John J.;;Dr.\\; PhD"
        );
        assert_eq!(unmask_component("Dr.\\; PhD", VCardVersion::V2_1), "Dr.; PhD");
    }
}
