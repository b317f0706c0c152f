//! Transport encodings (`ENCODING` parameter).

use super::version::VCardVersion;

/// Codec wrapped around a raw value before masking is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportEncoding {
    #[default]
    None,
    QuotedPrintable,
    Base64,
}

impl TransportEncoding {
    /// Parses an `ENCODING` value or a 2.1 bare encoding token.
    ///
    /// `7BIT` and `8BIT` map to [`TransportEncoding::None`].
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("QUOTED-PRINTABLE") || token.eq_ignore_ascii_case("Q") {
            Some(Self::QuotedPrintable)
        } else if token.eq_ignore_ascii_case("BASE64") || token.eq_ignore_ascii_case("B") {
            Some(Self::Base64)
        } else if token.eq_ignore_ascii_case("7BIT") || token.eq_ignore_ascii_case("8BIT") {
            Some(Self::None)
        } else {
            None
        }
    }

    /// Returns the `ENCODING` parameter value for `version`, if one is written.
    #[must_use]
    pub const fn as_param(self, version: VCardVersion) -> Option<&'static str> {
        match (self, version) {
            (Self::None, _) | (_, VCardVersion::V4_0) => None,
            (Self::QuotedPrintable, _) => Some("QUOTED-PRINTABLE"),
            (Self::Base64, VCardVersion::V2_1) => Some("BASE64"),
            (Self::Base64, VCardVersion::V3_0) => Some("b"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aliases() {
        assert_eq!(TransportEncoding::parse("b"), Some(TransportEncoding::Base64));
        assert_eq!(
            TransportEncoding::parse("quoted-printable"),
            Some(TransportEncoding::QuotedPrintable)
        );
        assert_eq!(TransportEncoding::parse("8bit"), Some(TransportEncoding::None));
        assert_eq!(TransportEncoding::parse("uuencode"), None);
    }

    #[test]
    fn parameter_spelling_per_version() {
        assert_eq!(
            TransportEncoding::Base64.as_param(VCardVersion::V2_1),
            Some("BASE64")
        );
        assert_eq!(TransportEncoding::Base64.as_param(VCardVersion::V3_0), Some("b"));
        assert_eq!(TransportEncoding::Base64.as_param(VCardVersion::V4_0), None);
    }
}
