//! vCard property values.

use chrono::{DateTime, Utc};

use super::datetime::DateAndOrTime;
use super::kind::{PropertyKind, ValueShape, ValueType};
use super::version::VCardVersion;

/// A decoded property value.
///
/// The variant reflects how the value is split on the wire: structured values
/// keep one list of items per `;` component, lists keep one item per `,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VCardValue {
    Text(String),
    TextList(Vec<String>),
    /// Components separated by `;`, each holding `,`-separated items.
    Structured(Vec<Vec<String>>),
    Uri(String),
    DateAndOrTime(DateAndOrTime),
    Timestamp(DateTime<Utc>),
    /// Embedded binary payload with its media type, if known.
    Binary {
        data: Vec<u8>,
        media_type: Option<String>,
    },
}

impl VCardValue {
    /// Creates a structured value with one item per component.
    #[must_use]
    pub fn components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Structured(
            components
                .into_iter()
                .map(|c| {
                    let c = c.into();
                    if c.is_empty() { Vec::new() } else { vec![c] }
                })
                .collect(),
        )
    }

    /// Returns whether the value carries no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::Uri(s) => s.is_empty(),
            Self::TextList(items) => items.iter().all(String::is_empty),
            Self::Structured(components) => components
                .iter()
                .all(|items| items.iter().all(String::is_empty)),
            Self::DateAndOrTime(DateAndOrTime::Partial(s)) => s.is_empty(),
            Self::DateAndOrTime(_) | Self::Timestamp(_) => false,
            Self::Binary { data, .. } => data.is_empty(),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_structured(&self) -> Option<&[Vec<String>]> {
        match self {
            Self::Structured(components) => Some(components),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date_and_or_time(&self) -> Option<&DateAndOrTime> {
        match self {
            Self::DateAndOrTime(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the first item of structured component `index`.
    #[must_use]
    pub fn component(&self, index: usize) -> Option<&str> {
        self.as_structured()?
            .get(index)?
            .first()
            .map(String::as_str)
    }

    /// The value type this value denotes when written as `kind` in `version`.
    ///
    /// `None` means the value carries no type of its own and the writer falls
    /// back to an explicit `VALUE` parameter, if any.
    #[must_use]
    pub fn implied_type(&self, kind: PropertyKind, version: VCardVersion) -> Option<ValueType> {
        let v4 = matches!(version, VCardVersion::V4_0);
        match self {
            Self::Text(_) | Self::TextList(_) | Self::Structured(_) => {
                match kind.shape(version) {
                    ValueShape::Text | ValueShape::List | ValueShape::Structured => None,
                    ValueShape::DateAndOrTime if !v4 => None,
                    _ => Some(ValueType::Text),
                }
            }
            Self::Uri(_) => Some(ValueType::Uri),
            Self::Binary { .. } if v4 => Some(ValueType::Uri),
            Self::Binary { .. } => Some(ValueType::Binary),
            Self::DateAndOrTime(_) if v4 => Some(ValueType::DateAndOrTime),
            Self::DateAndOrTime(DateAndOrTime::DateTime { .. }) => Some(ValueType::DateTime),
            Self::DateAndOrTime(_) => Some(ValueType::Date),
            Self::Timestamp(_) => Some(ValueType::Timestamp),
        }
    }
}

impl From<&str> for VCardValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for VCardValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateAndOrTime> for VCardValue {
    fn from(value: DateAndOrTime) -> Self {
        Self::DateAndOrTime(value)
    }
}
