//! vCard parse error types.

use std::fmt;

/// Result type for vCard parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred during vCard parsing.
///
/// Structural errors are returned to the caller. Row- and value-level errors
/// use the same type but are collected as diagnostics while parsing goes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Physical line number where the logical line starts (1-based, 0 if
    /// unknown).
    pub line: usize,
    /// Additional context or message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    /// Creates a missing property error.
    #[must_use]
    pub fn missing_property(line: usize, name: &str) -> Self {
        Self::new(
            ParseErrorKind::MissingProperty,
            line,
            format!("missing required property: {name}"),
        )
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(line: usize, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::InvalidValue, line, message)
    }

    /// Returns whether the error aborts the record rather than a single row.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::MissingBegin
                | ParseErrorKind::MissingEnd
                | ParseErrorKind::UnsupportedVersion
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input holds content but no `BEGIN:VCARD`.
    MissingBegin,
    /// A record is not closed by `END:VCARD`.
    MissingEnd,
    /// Unsupported vCard version.
    UnsupportedVersion,
    /// Missing required property.
    MissingProperty,
    /// Empty key or missing `:` separator.
    InvalidPropertyName,
    /// Invalid parameter.
    InvalidParameter,
    /// Continuation line without a preceding line.
    OrphanContinuation,
    /// Invalid property value.
    InvalidValue,
    /// Invalid date or time.
    InvalidDateTime,
    /// Undecodable transport encoding.
    EncodingError,
    /// A card nested inside another card.
    NestedCard,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBegin => write!(f, "missing BEGIN:VCARD"),
            Self::MissingEnd => write!(f, "missing END:VCARD"),
            Self::UnsupportedVersion => write!(f, "unsupported version"),
            Self::MissingProperty => write!(f, "missing property"),
            Self::InvalidPropertyName => write!(f, "invalid property name"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::OrphanContinuation => write!(f, "orphan continuation line"),
            Self::InvalidValue => write!(f, "invalid value"),
            Self::InvalidDateTime => write!(f, "invalid date/time"),
            Self::EncodingError => write!(f, "encoding error"),
            Self::NestedCard => write!(f, "nested card"),
        }
    }
}
