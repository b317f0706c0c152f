//! Value decoding by property kind.
//!
//! Value-level problems never fail a parse: unparsable dates degrade to text
//! and undecodable binaries drop the property. Both are reported as
//! diagnostics.

use super::error::{ParseError, ParseErrorKind};
use super::lexer::ContentRow;
use crate::rfc::vcard::codec::data_url::{self, DataUrl};
use crate::rfc::vcard::codec::mask::{split_unescaped, unmask, unmask_component};
use crate::rfc::vcard::codec::base64 as payload;
use crate::rfc::vcard::core::{
    DateAndOrTime, ParameterSet, PropertyKind, TransportEncoding, VCardProperty, VCardValue,
    VCardVersion, ValueShape, ValueType, parse_timestamp,
};

/// Builds a property from a tokenized row.
///
/// Returns `None` when the value cannot be represented at all (an invalid
/// embedded binary); the reason is pushed to `diagnostics`.
pub fn decode_property(
    row: &ContentRow<'_>,
    diagnostics: &mut Vec<ParseError>,
) -> Option<VCardProperty> {
    let kind = PropertyKind::from_name(&row.key);
    let mut params = ParameterSet::from_params(&row.params, kind, row.version);
    let value = decode_value(row, kind, &mut params, diagnostics)?;

    // The transport encoding has been removed from the value by now.
    params.encoding = TransportEncoding::None;
    params.charset = None;

    // A VALUE the decoded value already carries, or the kind's default, is
    // dropped so the writer derives it again.
    if value.implied_type(kind, row.version).is_some()
        || params.value_type == Some(kind.default_value_type(row.version))
    {
        params.value_type = None;
    }

    Some(VCardProperty {
        group: row.group.map(str::to_string),
        name: row.key.clone(),
        params,
        value,
    })
}

fn decode_value(
    row: &ContentRow<'_>,
    kind: PropertyKind,
    params: &mut ParameterSet,
    diagnostics: &mut Vec<ParseError>,
) -> Option<VCardValue> {
    let version = row.version;
    let raw = row.raw_value.as_ref();
    let explicit = params.value_type;

    let value = match kind.shape(version) {
        ValueShape::Binary => return decode_binary(row, params, diagnostics),
        ValueShape::Uri if explicit == Some(ValueType::Text) => text(row),
        ValueShape::Uri => VCardValue::Uri(raw.to_string()),
        ValueShape::Structured => VCardValue::Structured(split_structured(raw, version)),
        ValueShape::List => VCardValue::TextList(split_list(raw, version)),
        ValueShape::DateAndOrTime if explicit == Some(ValueType::Text) => text(row),
        ValueShape::DateAndOrTime => {
            let value = row.value();
            match DateAndOrTime::parse(&value) {
                Some(parsed) => VCardValue::DateAndOrTime(parsed),
                None => fallback_to_text(row, value.into_owned(), diagnostics),
            }
        }
        ValueShape::Timestamp => {
            let value = row.value();
            match parse_timestamp(&value) {
                Some(parsed) => VCardValue::Timestamp(parsed),
                None => fallback_to_text(row, value.into_owned(), diagnostics),
            }
        }
        ValueShape::Text if explicit == Some(ValueType::Uri) => VCardValue::Uri(raw.to_string()),
        ValueShape::Text => text(row),
    };
    Some(value)
}

fn text(row: &ContentRow<'_>) -> VCardValue {
    VCardValue::Text(row.value().into_owned())
}

fn fallback_to_text(
    row: &ContentRow<'_>,
    value: String,
    diagnostics: &mut Vec<ParseError>,
) -> VCardValue {
    if !value.trim().is_empty() {
        tracing::debug!(key = %row.key, line = row.line, "Keeping unparsable date/time as text");
        diagnostics.push(ParseError::new(
            ParseErrorKind::InvalidDateTime,
            row.line,
            format!("{}: unparsable value {value:?} kept as text", row.key),
        ));
    }
    VCardValue::Text(value)
}

fn decode_binary(
    row: &ContentRow<'_>,
    params: &mut ParameterSet,
    diagnostics: &mut Vec<ParseError>,
) -> Option<VCardValue> {
    let raw = row.raw_value.as_ref();

    if params.encoding == TransportEncoding::Base64 {
        return match payload::unwrap(raw) {
            Ok(data) => Some(VCardValue::Binary {
                data,
                media_type: params.media_type.take(),
            }),
            Err(err) => {
                drop_binary(row, &err.to_string(), diagnostics);
                None
            }
        };
    }

    if raw.trim_start().get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:")) {
        return match data_url::parse(raw.trim()) {
            Some(DataUrl::Binary { media_type, data }) => Some(VCardValue::Binary {
                data,
                media_type: media_type.or_else(|| params.media_type.take()),
            }),
            Some(DataUrl::Text(text)) => Some(VCardValue::Text(text)),
            None => {
                drop_binary(row, "invalid data URL", diagnostics);
                None
            }
        };
    }

    if params.value_type == Some(ValueType::Text) {
        return Some(text(row));
    }
    Some(VCardValue::Uri(raw.to_string()))
}

fn drop_binary(row: &ContentRow<'_>, reason: &str, diagnostics: &mut Vec<ParseError>) {
    tracing::warn!(key = %row.key, line = row.line, reason, "Dropping undecodable binary value");
    diagnostics.push(ParseError::new(
        ParseErrorKind::EncodingError,
        row.line,
        format!("{}: {reason}", row.key),
    ));
}

/// Splits a structured value into components of items.
///
/// Components split on unescaped `;`; items split on unescaped `,` except in
/// 2.1, which has no comma escaping.
#[must_use]
pub fn split_structured(raw: &str, version: VCardVersion) -> Vec<Vec<String>> {
    split_unescaped(raw, b';')
        .into_iter()
        .map(|component| {
            if component.is_empty() {
                Vec::new()
            } else if version.has_escaping() {
                split_unescaped(component, b',')
                    .into_iter()
                    .map(|item| unmask_component(item, version).into_owned())
                    .collect()
            } else {
                vec![unmask_component(component, version).into_owned()]
            }
        })
        .collect()
}

/// Splits a list value on unescaped commas.
#[must_use]
pub fn split_list(raw: &str, version: VCardVersion) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    split_unescaped(raw, b',')
        .into_iter()
        .map(|item| unmask(item, version).into_owned())
        .collect()
}
