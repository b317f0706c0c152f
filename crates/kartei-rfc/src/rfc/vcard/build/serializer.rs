//! vCard serialization.
//!
//! A [`VcfWriter`] is one writing session for one target version. It walks a
//! card's properties in canonical kind order, picks the instances the version
//! can carry, emits parameters through its [`ParameterSerializer`], encodes the
//! value and folds the finished line.

use std::collections::BTreeMap;

use kartei_core::config::{CompatConfig, Settings};
use kartei_core::constants::{BEGIN_VCARD, CRLF, DEFAULT_CHARSET, DEFAULT_LINE_BUDGET, END_VCARD};
use kartei_core::error::CoreError;

use super::compat::{CompatTransform, transforms_for};
use super::fold::{MIN_BUDGET, fold_line};
use super::params::{EmitContext, ParameterSerializer};
use crate::error::{RfcError, RfcResult};
use crate::rfc::vcard::codec::mask::{join_list, join_structured, mask};
use crate::rfc::vcard::codec::{base64 as payload, data_url, quoted_printable};
use crate::rfc::vcard::core::{
    PREF_UNSET, ParameterSet, PropertyKind, TransportEncoding, VCard, VCardProperty, VCardValue,
    VCardVersion, ValueShape, format_timestamp,
};

/// Writer behavior.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub version: VCardVersion,
    /// Content octets per physical line, excluding the CRLF.
    pub line_budget: usize,
    /// Charset declared for 2.1 quoted-printable values.
    pub charset: String,
    /// Write properties whose value is empty.
    pub keep_empty: bool,
    pub write_non_standard_parameters: bool,
    pub compat: CompatConfig,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            version: VCardVersion::default(),
            line_budget: DEFAULT_LINE_BUDGET,
            charset: DEFAULT_CHARSET.to_string(),
            keep_empty: false,
            write_non_standard_parameters: true,
            compat: CompatConfig::default(),
        }
    }
}

impl TryFrom<&Settings> for WriterOptions {
    type Error = RfcError;

    fn try_from(settings: &Settings) -> RfcResult<Self> {
        let codec = &settings.codec;
        let version = VCardVersion::parse(&codec.version)
            .ok_or_else(|| RfcError::UnsupportedVersion(codec.version.clone()))?;
        if codec.line_budget < MIN_BUDGET {
            return Err(CoreError::ConfigError(format!(
                "codec.line_budget must be at least {MIN_BUDGET}, got {}",
                codec.line_budget
            ))
            .into());
        }

        Ok(Self {
            version,
            line_budget: codec.line_budget,
            charset: codec.charset.clone(),
            keep_empty: codec.keep_empty,
            write_non_standard_parameters: codec.write_non_standard_parameters,
            compat: settings.compat.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    NotStarted,
    Header,
    Properties,
    Footer,
    Done,
}

/// A writing session.
///
/// Holds scratch state (parameter buffer, `ALTID` counter); use one per thread.
#[derive(Debug)]
pub struct VcfWriter {
    version: VCardVersion,
    options: WriterOptions,
    params: ParameterSerializer,
    transforms: Vec<Box<dyn CompatTransform>>,
    next_alt_id: u32,
}

impl VcfWriter {
    /// Creates a session writing `version`; `options.version` is overridden.
    #[must_use]
    pub fn new(version: VCardVersion, mut options: WriterOptions) -> Self {
        options.version = version;
        Self {
            version,
            params: ParameterSerializer::new(version)
                .with_non_standard(options.write_non_standard_parameters),
            transforms: if matches!(version, VCardVersion::V4_0) {
                Vec::new()
            } else {
                transforms_for(&options.compat)
            },
            options,
            next_alt_id: 1,
        }
    }

    /// Creates a session writing `options.version`.
    #[must_use]
    pub fn from_options(options: WriterOptions) -> Self {
        Self::new(options.version, options)
    }

    #[must_use]
    pub const fn version(&self) -> VCardVersion {
        self.version
    }

    /// Serializes one card, CRLF-terminated.
    ///
    /// Properties the target version cannot carry are omitted.
    #[tracing::instrument(
        skip(self, card),
        fields(version = %self.version, properties = card.properties.len())
    )]
    pub fn write_card(&mut self, card: &VCard) -> String {
        let mut out = String::with_capacity(card.properties.len() * 48 + 48);
        let mut state = WriterState::NotStarted;
        self.next_alt_id = 1;

        while state != WriterState::Done {
            state = match state {
                WriterState::NotStarted => WriterState::Header,
                WriterState::Header => {
                    push_line(&mut out, BEGIN_VCARD);
                    push_line(&mut out, &format!("VERSION:{}", self.version));
                    WriterState::Properties
                }
                WriterState::Properties => {
                    self.write_properties(card, &mut out);
                    WriterState::Footer
                }
                WriterState::Footer => {
                    push_line(&mut out, END_VCARD);
                    WriterState::Done
                }
                WriterState::Done => WriterState::Done,
            };
        }

        tracing::debug!(output_len = out.len(), "vCard serialized");
        out
    }

    /// Serializes one property to a folded content line without the final
    /// CRLF.
    ///
    /// Returns `None` when the property is unsupported in the target version,
    /// empty (unless empty values are kept) or has an invalid name.
    pub fn serialize_property(
        &mut self,
        property: &VCardProperty,
        is_preferred: bool,
    ) -> Option<String> {
        let kind = property.kind();
        if !kind.is_supported(self.version) {
            tracing::debug!(name = %property.name, version = %self.version, "Property not supported by target version");
            return None;
        }
        if !self.options.keep_empty && property.value.is_empty() {
            return None;
        }
        self.render(property, is_preferred, None)
    }

    fn write_properties(&mut self, card: &VCard, out: &mut String) {
        let mut by_kind: BTreeMap<PropertyKind, Vec<&VCardProperty>> = BTreeMap::new();
        for property in &card.properties {
            by_kind.entry(property.kind()).or_default().push(property);
        }
        let synthesize_labels = !by_kind.contains_key(&PropertyKind::Label);
        let keep_empty = self.options.keep_empty;

        for (kind, properties) in by_kind {
            if !kind.is_supported(self.version) {
                tracing::debug!(
                    ?kind,
                    count = properties.len(),
                    version = %self.version,
                    "Omitting properties unsupported by target version"
                );
                continue;
            }

            let candidates: Vec<&VCardProperty> = properties
                .into_iter()
                .filter(|p| keep_empty || !p.value.is_empty())
                .collect();
            if candidates.is_empty() {
                continue;
            }

            match self.version {
                VCardVersion::V4_0 => self.write_alternatives(kind, &candidates, out),
                VCardVersion::V2_1 | VCardVersion::V3_0 if kind.allows_multiple(self.version) => {
                    self.write_repeated(kind, &candidates, synthesize_labels, out);
                }
                VCardVersion::V2_1 | VCardVersion::V3_0 => {
                    let best = preferred_index(&candidates);
                    if candidates.len() > 1 {
                        tracing::debug!(
                            ?kind,
                            dropped = candidates.len() - 1,
                            "Keeping only the preferred instance"
                        );
                    }
                    self.write_line(candidates[best], true, None, out);
                }
            }
        }

        self.write_extensions(card, out);
    }

    /// 4.0: every instance; alternatives of one value share an `ALTID`.
    fn write_alternatives(
        &mut self,
        kind: PropertyKind,
        candidates: &[&VCardProperty],
        out: &mut String,
    ) {
        let shared = (kind.groups_alternatives()
            && candidates.len() > 1
            && candidates.iter().all(|p| p.params.alt_id.is_none()))
        .then(|| {
            let id = self.next_alt_id.to_string();
            self.next_alt_id += 1;
            id
        });

        for property in candidates {
            self.write_line(property, false, shared.as_deref(), out);
        }
    }

    /// 2.1/3.0 repeatable kinds: every instance, the preferred one marked.
    fn write_repeated(
        &mut self,
        kind: PropertyKind,
        candidates: &[&VCardProperty],
        synthesize_labels: bool,
        out: &mut String,
    ) {
        let preferred = preferred_index(candidates);
        let marked = candidates[preferred].params.preference() < PREF_UNSET;

        for (i, property) in candidates.iter().enumerate() {
            let is_preferred = marked && i == preferred;
            self.write_line(property, is_preferred, None, out);

            if kind == PropertyKind::Address
                && synthesize_labels
                && (i == preferred || self.options.compat.all_address_labels)
                && let Some(label) = address_label(property)
            {
                self.write_line(&label, is_preferred, None, out);
            }
        }
    }

    fn write_extensions(&mut self, card: &VCard, out: &mut String) {
        if self.transforms.is_empty() {
            return;
        }

        let synthesized: Vec<VCardProperty> = self
            .transforms
            .iter()
            .flat_map(|transform| {
                let properties = transform.synthesize(card);
                tracing::trace!(
                    transform = transform.name(),
                    count = properties.len(),
                    "Compatibility properties"
                );
                properties
            })
            .filter(|p| card.properties_named(&p.name).next().is_none())
            .collect();

        for property in &synthesized {
            self.write_line(property, false, None, out);
        }
    }

    fn write_line(
        &mut self,
        property: &VCardProperty,
        is_preferred: bool,
        alt_id: Option<&str>,
        out: &mut String,
    ) {
        if let Some(line) = self.render(property, is_preferred, alt_id) {
            push_line(out, &line);
        }
    }

    fn render(
        &mut self,
        property: &VCardProperty,
        is_preferred: bool,
        alt_id: Option<&str>,
    ) -> Option<String> {
        let version = self.version;
        let kind = property.kind();

        if !is_valid_name(&property.name)
            || is_framing_name(&property.name)
            || property.group.as_deref().is_some_and(|g| !is_valid_name(g))
        {
            tracing::debug!(name = %property.name, "Omitting property with unusable name");
            return None;
        }

        let params = &property.params;
        let mut ctx = EmitContext::new(params, kind).preferred(is_preferred);
        ctx.value_type = property.value.implied_type(kind, version).or(params.value_type);
        ctx.encoding = TransportEncoding::None;
        ctx.charset = None;
        if alt_id.is_some() {
            ctx.alt_id = alt_id;
        }

        let value = match &property.value {
            VCardValue::Binary { data, media_type } => {
                let media_type = media_type.as_deref().or(params.media_type.as_deref());
                if matches!(version, VCardVersion::V4_0) {
                    ctx.media_type = None;
                    data_url::format_base64(media_type, data)
                } else {
                    ctx.media_type = media_type;
                    ctx.encoding = TransportEncoding::Base64;
                    payload::wrap(data, version)
                }
            }
            VCardValue::Text(text)
                if matches!(version, VCardVersion::V4_0)
                    && kind.shape(version) == ValueShape::Binary =>
            {
                ctx.value_type = None;
                data_url::format_text(text)
            }
            VCardValue::Text(text) => mask(text, version).into_owned(),
            VCardValue::TextList(items) => join_list(items, version),
            VCardValue::Structured(components) => join_structured(components, version),
            VCardValue::Uri(uri) => uri.clone(),
            VCardValue::DateAndOrTime(value) => value.format(version),
            VCardValue::Timestamp(value) => format_timestamp(value, version),
        };

        let use_qp = matches!(version, VCardVersion::V2_1)
            && matches!(
                property.value,
                VCardValue::Text(_) | VCardValue::TextList(_) | VCardValue::Structured(_)
            )
            && quoted_printable::needs_encoding(&value);
        if use_qp {
            ctx.encoding = TransportEncoding::QuotedPrintable;
            ctx.charset = Some(&self.options.charset);
        }

        let mut line = String::with_capacity(property.name.len() + value.len() + 32);
        if let Some(group) = &property.group {
            line.push_str(group);
            line.push('.');
        }
        line.push_str(&property.name);
        line.push_str(self.params.serialize(&ctx));
        line.push(':');
        if use_qp {
            let encoded = quoted_printable::encode(
                &value,
                Some(&self.options.charset),
                line.len(),
                self.options.line_budget,
            );
            line.push_str(&encoded);
        } else {
            line.push_str(&value);
        }

        tracing::trace!(name = %property.name, len = line.len(), "Serialized property");
        Some(fold_line(&line, version, self.options.line_budget))
    }
}

/// Index of the most preferred instance; the first one wins ties.
fn preferred_index(candidates: &[&VCardProperty]) -> usize {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| p.params.preference())
        .map_or(0, |(i, _)| i)
}

/// The `LABEL` property for an address carrying a `LABEL` parameter.
fn address_label(address: &VCardProperty) -> Option<VCardProperty> {
    let label = address.params.label.as_deref()?;
    if label.trim().is_empty() {
        return None;
    }

    let mut params = ParameterSet::new();
    params.usage = address.params.usage;
    params.address_kind = address.params.address_kind;
    params.pref = address.params.pref;
    params.language.clone_from(&address.params.language);

    Some(VCardProperty {
        group: address.group.clone(),
        name: "LABEL".to_string(),
        params,
        value: VCardValue::Text(label.to_string()),
    })
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn is_framing_name(name: &str) -> bool {
    ["BEGIN", "END", "VERSION"]
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(CRLF);
}

/// Serializes cards, each in its own version with default options.
#[must_use]
pub fn serialize(cards: &[VCard]) -> String {
    cards
        .iter()
        .map(|card| VcfWriter::new(card.version, WriterOptions::default()).write_card(card))
        .collect()
}

/// Serializes cards in `version`.
#[must_use]
pub fn serialize_as(cards: &[VCard], version: VCardVersion, options: &WriterOptions) -> String {
    let mut writer = VcfWriter::new(version, options.clone());
    cards.iter().map(|card| writer.write_card(card)).collect()
}

/// Serializes one property given as key, value and parameters.
///
/// Returns the folded content line without the final CRLF, or `None` when the
/// property cannot be written in `version`.
#[must_use]
pub fn serialize_property(
    key: &str,
    value: &VCardValue,
    params: &ParameterSet,
    version: VCardVersion,
    is_preferred: bool,
) -> Option<String> {
    let property = VCardProperty {
        group: None,
        name: key.to_ascii_uppercase(),
        params: params.clone(),
        value: value.clone(),
    };
    VcfWriter::new(version, WriterOptions::default()).serialize_property(&property, is_preferred)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::rfc::vcard::core::{DateAndOrTime, Usage};

    fn card(version: VCardVersion, properties: Vec<VCardProperty>) -> VCard {
        let mut card = VCard::with_version(version);
        for property in properties {
            card.add_property(property);
        }
        card
    }

    fn body(output: &str) -> Vec<&str> {
        let lines: Vec<&str> = output.split(CRLF).collect();
        lines[2..lines.len() - 2].to_vec()
    }

    fn photo() -> VCardProperty {
        VCardProperty::new(
            "PHOTO",
            VCardValue::Binary {
                data: b"hello".to_vec(),
                media_type: Some("image/jpeg".into()),
            },
        )
    }

    #[test_log::test]
    fn framing() {
        let output = serialize(&[card(
            VCardVersion::V4_0,
            vec![VCardProperty::text("FN", "John Doe")],
        )]);
        assert_eq!(
            output,
            "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:John Doe\r\nEND:VCARD\r\n"
        );
    }

    #[test]
    fn canonical_order() {
        let output = serialize(&[card(
            VCardVersion::V4_0,
            vec![
                VCardProperty::text("X-CUSTOM", "x"),
                VCardProperty::text("EMAIL", "a@example.com"),
                VCardProperty::text("FN", "A"),
                VCardProperty::text("TEL", "+1"),
            ],
        )]);
        assert_eq!(
            body(&output),
            ["FN:A", "TEL:+1", "EMAIL:a@example.com", "X-CUSTOM:x"]
        );
    }

    #[test]
    fn unsupported_and_empty_are_omitted() {
        let input = card(
            VCardVersion::V4_0,
            vec![
                VCardProperty::text("FN", "A"),
                VCardProperty::new("GENDER", VCardValue::components(["M"])),
                VCardProperty::text("NOTE", ""),
            ],
        );
        let output = serialize_as(&[input.clone()], VCardVersion::V3_0, &WriterOptions::default());
        assert_eq!(body(&output), ["FN:A"]);

        let options = WriterOptions {
            keep_empty: true,
            ..WriterOptions::default()
        };
        let output = serialize_as(&[input], VCardVersion::V3_0, &options);
        assert_eq!(body(&output), ["FN:A", "NOTE:"]);
    }

    #[test]
    fn masked_text_per_version() {
        let value = VCardValue::from("Bodo, der Blöde");
        let params = ParameterSet::new();
        assert_eq!(
            serialize_property("FN", &value, &params, VCardVersion::V3_0, false).as_deref(),
            Some("FN:Bodo\\, der Blöde")
        );
        assert_eq!(
            serialize_property("FN", &value, &params, VCardVersion::V2_1, false).as_deref(),
            Some("FN;ENCODING=QUOTED-PRINTABLE;CHARSET=UTF-8:Bodo, der Bl=C3=B6de")
        );
    }

    #[test]
    fn binary_per_version() {
        let mut writer = VcfWriter::new(VCardVersion::V4_0, WriterOptions::default());
        assert_eq!(
            writer.serialize_property(&photo(), false).as_deref(),
            Some("PHOTO:data:image/jpeg;base64,aGVsbG8=")
        );
        let mut writer = VcfWriter::new(VCardVersion::V3_0, WriterOptions::default());
        assert_eq!(
            writer.serialize_property(&photo(), false).as_deref(),
            Some("PHOTO;ENCODING=b;TYPE=JPEG:aGVsbG8=")
        );
        let mut writer = VcfWriter::new(VCardVersion::V2_1, WriterOptions::default());
        assert_eq!(
            writer.serialize_property(&photo(), false).as_deref(),
            Some("PHOTO;ENCODING=BASE64;TYPE=JPEG:\r\n aGVsbG8=\r\n")
        );
    }

    #[test]
    fn uri_photo_gets_value_hint() {
        let photo = VCardProperty::uri("PHOTO", "http://example.com/a.jpg");
        let mut writer = VcfWriter::new(VCardVersion::V3_0, WriterOptions::default());
        assert_eq!(
            writer.serialize_property(&photo, false).as_deref(),
            Some("PHOTO;VALUE=uri:http://example.com/a.jpg")
        );
    }

    #[test]
    fn single_instance_keeps_preferred() {
        let input = card(
            VCardVersion::V4_0,
            vec![
                VCardProperty::text("TITLE", "Second").with_preference(2),
                VCardProperty::text("TITLE", "First").with_preference(1),
            ],
        );
        let output = serialize_as(&[input], VCardVersion::V3_0, &WriterOptions::default());
        assert_eq!(body(&output), ["TITLE:First"]);
    }

    #[test]
    fn repeated_kind_marks_preferred() {
        let input = card(
            VCardVersion::V4_0,
            vec![
                VCardProperty::text("EMAIL", "b@example.com").with_preference(2),
                VCardProperty::text("EMAIL", "a@example.com").with_preference(1),
            ],
        );
        let output = serialize_as(&[input], VCardVersion::V3_0, &WriterOptions::default());
        assert_eq!(
            body(&output),
            ["EMAIL:b@example.com", "EMAIL;TYPE=PREF:a@example.com"]
        );
    }

    #[test]
    fn alternatives_share_altid() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 2).unwrap();
        let input = card(
            VCardVersion::V4_0,
            vec![
                VCardProperty::new("BDAY", DateAndOrTime::from(date)),
                VCardProperty::text("BDAY", "circa 2000"),
            ],
        );
        let output = serialize(&[input]);
        assert_eq!(
            body(&output),
            ["BDAY;ALTID=1:20000102", "BDAY;VALUE=text;ALTID=1:circa 2000"]
        );
    }

    #[test]
    fn label_follows_preferred_address() {
        let mut params = ParameterSet::new();
        params.usage.insert(Usage::HOME);
        params.label = Some("1 Main St\nTown".into());
        let address = VCardProperty::new(
            "ADR",
            VCardValue::components(["", "", "1 Main St", "Town", "", "", ""]),
        )
        .with_params(params);

        let output = serialize_as(
            &[card(VCardVersion::V4_0, vec![address.clone()])],
            VCardVersion::V3_0,
            &WriterOptions::default(),
        );
        assert_eq!(
            body(&output),
            ["ADR;TYPE=HOME:;;1 Main St;Town;;;", "LABEL;TYPE=HOME:1 Main St\\nTown"]
        );

        let output = serialize(&[card(VCardVersion::V4_0, vec![address])]);
        assert_eq!(
            body(&output),
            ["ADR;TYPE=home;LABEL=1 Main St^nTown:;;1 Main St;Town;;;"]
        );
    }

    #[test]
    fn compat_properties_are_appended() {
        let options = WriterOptions {
            compat: CompatConfig {
                x_gender: true,
                ..CompatConfig::default()
            },
            ..WriterOptions::default()
        };
        let input = card(
            VCardVersion::V4_0,
            vec![
                VCardProperty::text("FN", "A"),
                VCardProperty::new("GENDER", VCardValue::components(["F"])),
            ],
        );
        let output = serialize_as(&[input.clone()], VCardVersion::V3_0, &options);
        assert_eq!(body(&output), ["FN:A", "X-GENDER:Female", "X-WAB-GENDER:1"]);

        let output = serialize_as(&[input], VCardVersion::V4_0, &options);
        assert_eq!(body(&output), ["FN:A", "GENDER:F"]);
    }

    #[test]
    fn long_lines_are_folded() {
        let note = "x".repeat(100);
        let output = serialize(&[card(
            VCardVersion::V4_0,
            vec![VCardProperty::text("NOTE", note)],
        )]);
        for line in output.split(CRLF) {
            assert!(line.len() <= DEFAULT_LINE_BUDGET);
        }
        assert!(output.contains("\r\n x"));
    }

    #[test]
    fn framing_names_are_not_properties() {
        let mut writer = VcfWriter::new(VCardVersion::V4_0, WriterOptions::default());
        assert_eq!(
            writer.serialize_property(&VCardProperty::text("VERSION", "3.0"), false),
            None
        );
        assert_eq!(
            writer.serialize_property(&VCardProperty::text("X-BAD NAME", "a"), false),
            None
        );
    }

    #[test]
    fn options_from_settings() {
        let mut settings = Settings::default();
        settings.codec.version = "2.1".into();
        settings.compat.x_spouse = true;
        let options = WriterOptions::try_from(&settings).unwrap();
        assert_eq!(options.version, VCardVersion::V2_1);
        assert!(options.compat.x_spouse);

        settings.codec.version = "5.0".into();
        assert!(matches!(
            WriterOptions::try_from(&settings),
            Err(RfcError::UnsupportedVersion(v)) if v == "5.0"
        ));

        settings.codec.version = "3.0".into();
        settings.codec.line_budget = 2;
        assert!(matches!(
            WriterOptions::try_from(&settings),
            Err(RfcError::CoreError(CoreError::ConfigError(_)))
        ));
    }
}
