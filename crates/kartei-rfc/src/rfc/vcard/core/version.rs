//! vCard format generations.

use std::fmt;

/// The vCard version a record is read or written in.
///
/// Selects the masking grammar, the parameter vocabulary and the folding
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum VCardVersion {
    /// vCard 2.1 (versit consortium).
    V2_1,
    /// vCard 3.0 (RFC 2426).
    V3_0,
    /// vCard 4.0 (RFC 6350).
    #[default]
    V4_0,
}

impl VCardVersion {
    /// Returns the version token as written after `VERSION:`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2_1 => "2.1",
            Self::V3_0 => "3.0",
            Self::V4_0 => "4.0",
        }
    }

    /// Parses a version token, ignoring surrounding whitespace.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "2.1" => Some(Self::V2_1),
            "3.0" => Some(Self::V3_0),
            "4.0" => Some(Self::V4_0),
            _ => None,
        }
    }

    /// Whether values use the backslash escaping grammar.
    #[must_use]
    pub const fn has_escaping(self) -> bool {
        !matches!(self, Self::V2_1)
    }

    /// Whether `ENCODING=QUOTED-PRINTABLE` is honored when reading.
    #[must_use]
    pub const fn supports_quoted_printable(self) -> bool {
        matches!(self, Self::V2_1 | Self::V3_0)
    }
}

impl fmt::Display for VCardVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
