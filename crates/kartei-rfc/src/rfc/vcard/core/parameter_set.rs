//! Typed view of a property's parameters.

use super::encoding::TransportEncoding;
use super::kind::{PropertyKind, ValueShape, ValueType};
use super::parameter::{VCardParameter, names};
use super::type_flags::{AddressKind, EmailKind, PhoneKind, RelationKind, TypeFlags, Usage};
use super::version::VCardVersion;
use crate::rfc::vcard::codec::mask::unmask_parameter_value;

/// Preference value meaning "no preference given".
pub const PREF_UNSET: u8 = 100;

/// Standard parameters as typed fields plus a bag of everything else.
///
/// Each standard parameter holds at most one value, except `TYPE`, `PID` and
/// `SORT-AS` which are ordered lists. `TYPE` labels of a known vocabulary are
/// stored as flags; other labels are kept verbatim in [`ParameterSet::types`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterSet {
    pub usage: TypeFlags<Usage>,
    pub address_kind: TypeFlags<AddressKind>,
    pub phone_kind: TypeFlags<PhoneKind>,
    pub email_kind: TypeFlags<EmailKind>,
    pub relation: TypeFlags<RelationKind>,
    /// `TYPE` values outside the flag vocabularies, in input order.
    pub types: Vec<String>,
    pub value_type: Option<ValueType>,
    pub encoding: TransportEncoding,
    pub charset: Option<String>,
    pub language: Option<String>,
    /// `PREF`, 1 (most preferred) to 100.
    pub pref: Option<u8>,
    pub alt_id: Option<String>,
    pub pid: Vec<String>,
    pub index: Option<u32>,
    pub geo: Option<String>,
    pub tz: Option<String>,
    pub media_type: Option<String>,
    pub label: Option<String>,
    pub sort_as: Vec<String>,
    pub calscale: Option<String>,
    pub level: Option<String>,
    pub context: Option<String>,
    /// Unknown parameters as `(NAME, value)` pairs, one pair per value.
    pub non_standard: Vec<(String, String)>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a typed set from the raw parameters of a row.
    ///
    /// Quotes are removed and parameter escapes resolved for `version`.
    /// `TYPE=PREF` in 2.1/3.0 becomes `pref = 1`; `TYPE` values of 2.1/3.0
    /// binary properties (`TYPE=JPEG`) become a media type.
    #[must_use]
    pub fn from_params(params: &[VCardParameter], kind: PropertyKind, version: VCardVersion) -> Self {
        let mut set = Self::default();

        for param in params {
            let values: Vec<String> = param
                .values
                .iter()
                .map(|raw| clean_value(raw, version))
                .collect();
            let joined = || values.join(",");

            match param.name.as_str() {
                names::TYPE => {
                    for value in &values {
                        set.add_type(value, kind, version);
                    }
                }
                names::VALUE => {
                    set.value_type = values.first().and_then(|v| ValueType::parse(v));
                }
                names::ENCODING => {
                    if let Some(encoding) = values.first().and_then(|v| TransportEncoding::parse(v)) {
                        set.encoding = encoding;
                    }
                }
                names::CHARSET => set.charset = Some(joined()),
                names::LANGUAGE => set.language = Some(joined()),
                names::PREF => {
                    if let Some(pref) = values.first().and_then(|v| parse_pref(v)) {
                        set.pref = Some(pref);
                    }
                }
                names::ALTID => set.alt_id = Some(joined()),
                names::PID => set.pid.extend(values),
                names::INDEX => {
                    set.index = values.first().and_then(|v| v.trim().parse().ok());
                }
                names::GEO => set.geo = Some(joined()),
                names::TZ => set.tz = Some(joined()),
                names::MEDIATYPE => set.media_type = Some(joined()),
                names::LABEL => set.label = Some(joined()),
                names::SORT_AS => set.sort_as.extend(values),
                names::CALSCALE => set.calscale = Some(joined()),
                names::LEVEL => set.level = Some(joined()),
                names::CONTEXT => set.context = Some(joined()),
                _ => {
                    set.non_standard
                        .extend(values.into_iter().map(|v| (param.name.clone(), v)));
                }
            }
        }

        set
    }

    /// Routes one `TYPE` label to the vocabulary matching `kind`.
    pub fn add_type(&mut self, label: &str, kind: PropertyKind, version: VCardVersion) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }

        if label.eq_ignore_ascii_case("pref") && !matches!(version, VCardVersion::V4_0) {
            self.pref = Some(1);
            return;
        }
        if self.usage.insert_label(label) {
            return;
        }

        let routed = match kind {
            PropertyKind::Address | PropertyKind::Label => self.address_kind.insert_label(label),
            PropertyKind::Telephone => self.phone_kind.insert_label(label),
            PropertyKind::Email => self.email_kind.insert_label(label),
            PropertyKind::Related => self.relation.insert_label(label),
            _ => false,
        };
        if routed {
            return;
        }

        if kind.shape(version) == ValueShape::Binary
            && !matches!(version, VCardVersion::V4_0)
            && self.media_type.is_none()
        {
            self.media_type = Some(media_type_from_type(label, kind));
            return;
        }

        if !self.types.iter().any(|t| t.eq_ignore_ascii_case(label)) {
            self.types.push(label.to_string());
        }
    }

    /// Returns the effective preference (`PREF_UNSET` when absent).
    #[must_use]
    pub fn preference(&self) -> u8 {
        self.pref.unwrap_or(PREF_UNSET)
    }

    /// Sets the preference, clamped to `1..=100`.
    pub fn set_preference(&mut self, pref: u8) {
        self.pref = Some(pref.clamp(1, PREF_UNSET));
    }

    /// Lower-case `TYPE` labels valid for `kind` in `version`.
    ///
    /// Usage flags come first, then the kind's own vocabulary in bit order,
    /// then free labels.
    #[must_use]
    pub fn type_labels(&self, kind: PropertyKind, version: VCardVersion) -> Vec<String> {
        let mut labels: Vec<String> = self.usage.labels(version).map(str::to_string).collect();

        let vocabulary: Vec<&'static str> = match kind {
            PropertyKind::Address | PropertyKind::Label => {
                self.address_kind.labels(version).collect()
            }
            PropertyKind::Telephone => self.phone_kind.labels(version).collect(),
            PropertyKind::Email => self.email_kind.labels(version).collect(),
            PropertyKind::Related => self.relation.labels(version).collect(),
            _ => Vec::new(),
        };
        labels.extend(vocabulary.into_iter().map(str::to_string));
        labels.extend(self.types.iter().map(|t| t.to_ascii_lowercase()));
        labels
    }

    /// Returns the first value of a non-standard parameter.
    #[must_use]
    pub fn non_standard(&self, name: &str) -> Option<&str> {
        self.non_standard
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Strips surrounding quotes and resolves escapes.
fn clean_value(raw: &str, version: VCardVersion) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unmask_parameter_value(unquoted, version).into_owned()
}

/// Parses `PREF`, clamping out-of-range integers into `1..=100`.
fn parse_pref(value: &str) -> Option<u8> {
    let pref: i64 = value.trim().parse().ok()?;
    let clamped = pref.clamp(1, i64::from(PREF_UNSET));
    u8::try_from(clamped).ok()
}

/// Maps a 2.1/3.0 binary `TYPE` (e.g. `JPEG`) to a media type.
fn media_type_from_type(label: &str, kind: PropertyKind) -> String {
    let lower = label.to_ascii_lowercase();
    if lower.contains('/') {
        return lower;
    }
    let top = match kind {
        PropertyKind::Sound => "audio",
        PropertyKind::Key => "application",
        _ => "image",
    };
    format!("{top}/{lower}")
}
