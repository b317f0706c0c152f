//! Parameter emission.
//!
//! Each version maps a property kind to an ordered list of [`EmitStep`]s.
//! One generic emitter interprets the list, so the order of parameters in the
//! output is fixed per version and kind.

use std::borrow::Cow;

use crate::rfc::vcard::codec::mask::mask_parameter_value;
use crate::rfc::vcard::core::{
    PREF_UNSET, ParameterSet, PropertyKind, TransportEncoding, VCardVersion, ValueShape,
    ValueType, param_names,
};

/// One parameter the emitter may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitStep {
    Type,
    ValueType,
    Preference,
    Index,
    AltId,
    Pid,
    Language,
    MediaType,
    Label,
    Geo,
    TimeZone,
    SortAs,
    CalendarScale,
    Level,
    Context,
    Encoding,
    Charset,
    NonStandard,
}

use EmitStep as S;

const V4_GENERIC: &[EmitStep] = &[
    S::ValueType,
    S::Type,
    S::Preference,
    S::Index,
    S::AltId,
    S::Pid,
    S::Language,
    S::MediaType,
    S::Label,
    S::Geo,
    S::TimeZone,
    S::SortAs,
    S::CalendarScale,
    S::Level,
    S::Context,
    S::NonStandard,
];
const V4_TEXT: &[EmitStep] = &[
    S::ValueType,
    S::Type,
    S::Preference,
    S::Index,
    S::AltId,
    S::Pid,
    S::Language,
    S::NonStandard,
];
const V4_NAME: &[EmitStep] = &[S::ValueType, S::SortAs, S::AltId, S::Language, S::NonStandard];
const V4_ORG: &[EmitStep] = &[
    S::ValueType,
    S::SortAs,
    S::Type,
    S::Preference,
    S::Index,
    S::AltId,
    S::Pid,
    S::Language,
    S::NonStandard,
];
const V4_ADDRESS: &[EmitStep] = &[
    S::ValueType,
    S::Type,
    S::Preference,
    S::Index,
    S::AltId,
    S::Pid,
    S::Language,
    S::Label,
    S::Geo,
    S::TimeZone,
    S::NonStandard,
];
const V4_PLAIN: &[EmitStep] = &[
    S::ValueType,
    S::Type,
    S::Preference,
    S::Index,
    S::AltId,
    S::Pid,
    S::NonStandard,
];
const V4_URI: &[EmitStep] = &[
    S::ValueType,
    S::Type,
    S::Preference,
    S::Index,
    S::AltId,
    S::Pid,
    S::MediaType,
    S::NonStandard,
];
const V4_MEDIA: &[EmitStep] = &[
    S::ValueType,
    S::Type,
    S::Preference,
    S::Index,
    S::AltId,
    S::Pid,
    S::MediaType,
    S::Language,
    S::NonStandard,
];
const V4_DATE: &[EmitStep] = &[
    S::ValueType,
    S::AltId,
    S::CalendarScale,
    S::Language,
    S::NonStandard,
];
const V4_PLACE: &[EmitStep] = &[S::ValueType, S::AltId, S::Language, S::NonStandard];
const V4_INTEREST: &[EmitStep] = &[
    S::ValueType,
    S::Level,
    S::Type,
    S::Preference,
    S::Index,
    S::AltId,
    S::Language,
    S::NonStandard,
];
const V4_MEMBER: &[EmitStep] = &[
    S::ValueType,
    S::Preference,
    S::Index,
    S::AltId,
    S::Pid,
    S::MediaType,
    S::NonStandard,
];
const V4_SINGLE: &[EmitStep] = &[S::ValueType, S::NonStandard];

const V3_GENERIC: &[EmitStep] = &[
    S::Encoding,
    S::Type,
    S::ValueType,
    S::Language,
    S::NonStandard,
];
const V3_TEXT: &[EmitStep] = &[S::Type, S::ValueType, S::Language, S::NonStandard];
const V3_PLAIN: &[EmitStep] = &[S::Type, S::ValueType, S::NonStandard];
const V3_BINARY: &[EmitStep] = &[S::Encoding, S::Type, S::ValueType, S::NonStandard];
const V3_SINGLE: &[EmitStep] = &[S::ValueType, S::NonStandard];

const V21_TEXT: &[EmitStep] = &[
    S::Type,
    S::Encoding,
    S::Charset,
    S::Language,
    S::NonStandard,
];
const V21_PLAIN: &[EmitStep] = &[
    S::ValueType,
    S::Type,
    S::Encoding,
    S::Charset,
    S::NonStandard,
];
const V21_BINARY: &[EmitStep] = &[S::Encoding, S::Type, S::ValueType, S::NonStandard];

/// Returns the ordered parameter steps for `kind` in `version`.
#[must_use]
pub const fn emission_steps(kind: PropertyKind, version: VCardVersion) -> &'static [EmitStep] {
    match version {
        VCardVersion::V4_0 => steps_4_0(kind),
        VCardVersion::V3_0 => steps_3_0(kind),
        VCardVersion::V2_1 => steps_2_1(kind),
    }
}

const fn steps_4_0(kind: PropertyKind) -> &'static [EmitStep] {
    use PropertyKind as K;

    match kind {
        K::FormattedName
        | K::Nickname
        | K::Title
        | K::Role
        | K::Note
        | K::Categories
        | K::Pronouns
        | K::GramGender => V4_TEXT,
        K::StructuredName => V4_NAME,
        K::Organization => V4_ORG,
        K::Address => V4_ADDRESS,
        K::Telephone | K::Email | K::Language => V4_PLAIN,
        K::Impp
        | K::Url
        | K::SocialProfile
        | K::ContactUri
        | K::OrgDirectory
        | K::FreeBusyUrl
        | K::CalendarAddressUri
        | K::CalendarUri
        | K::Source
        | K::TimeZone
        | K::Geo
        | K::Key => V4_URI,
        K::Photo | K::Logo | K::Sound | K::Related => V4_MEDIA,
        K::Birthday | K::Anniversary | K::DeathDate => V4_DATE,
        K::BirthPlace | K::DeathPlace => V4_PLACE,
        K::Expertise | K::Hobby | K::Interest => V4_INTEREST,
        K::Member => V4_MEMBER,
        K::NonStandard => V4_GENERIC,
        _ => V4_SINGLE,
    }
}

const fn steps_3_0(kind: PropertyKind) -> &'static [EmitStep] {
    use PropertyKind as K;

    match kind {
        K::FormattedName
        | K::StructuredName
        | K::Name
        | K::Nickname
        | K::SortString
        | K::Title
        | K::Role
        | K::Note
        | K::Categories
        | K::Organization
        | K::Address
        | K::Label
        | K::Mailer => V3_TEXT,
        K::Telephone
        | K::Email
        | K::Impp
        | K::Url
        | K::Agent
        | K::FreeBusyUrl
        | K::CalendarAddressUri
        | K::CalendarUri => V3_PLAIN,
        K::Photo | K::Logo | K::Sound | K::Key => V3_BINARY,
        K::NonStandard => V3_GENERIC,
        _ => V3_SINGLE,
    }
}

const fn steps_2_1(kind: PropertyKind) -> &'static [EmitStep] {
    use PropertyKind as K;

    match kind {
        K::Photo | K::Logo | K::Sound | K::Key => V21_BINARY,
        K::Url | K::Birthday | K::Revision | K::TimeZone | K::Geo | K::Uid | K::Agent => {
            V21_PLAIN
        }
        _ => V21_TEXT,
    }
}

/// What the emitter needs besides the parameter set itself.
///
/// The writer decides the transport encoding, value type hint and `ALTID`;
/// [`EmitContext::new`] takes them from the parameter set.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    pub params: &'a ParameterSet,
    pub kind: PropertyKind,
    /// Instance chosen as preferred among its siblings (2.1/3.0 `TYPE=PREF`).
    pub is_preferred: bool,
    /// Type of the value; written only when it differs from the kind's default.
    pub value_type: Option<ValueType>,
    pub encoding: TransportEncoding,
    pub charset: Option<&'a str>,
    pub alt_id: Option<&'a str>,
    /// 4.0 `MEDIATYPE`; in 2.1/3.0 the subtype of a binary value's `TYPE`.
    pub media_type: Option<&'a str>,
}

impl<'a> EmitContext<'a> {
    #[must_use]
    pub fn new(params: &'a ParameterSet, kind: PropertyKind) -> Self {
        Self {
            params,
            kind,
            is_preferred: false,
            value_type: params.value_type,
            encoding: params.encoding,
            charset: params.charset.as_deref(),
            alt_id: params.alt_id.as_deref(),
            media_type: params.media_type.as_deref(),
        }
    }

    #[must_use]
    pub const fn preferred(mut self, is_preferred: bool) -> Self {
        self.is_preferred = is_preferred;
        self
    }
}

/// Emits parameter suffixes for one version.
///
/// Owns the scratch buffer the suffix is assembled in; create one per writer
/// session.
#[derive(Debug)]
pub struct ParameterSerializer {
    version: VCardVersion,
    write_non_standard: bool,
    scratch: String,
}

impl ParameterSerializer {
    #[must_use]
    pub fn new(version: VCardVersion) -> Self {
        Self {
            version,
            write_non_standard: true,
            scratch: String::with_capacity(64),
        }
    }

    /// Whether parameters outside the standard vocabulary are written.
    #[must_use]
    pub fn with_non_standard(mut self, enabled: bool) -> Self {
        self.write_non_standard = enabled;
        self
    }

    #[must_use]
    pub const fn version(&self) -> VCardVersion {
        self.version
    }

    /// Returns the `;NAME=value...` suffix for one property.
    pub fn serialize(&mut self, ctx: &EmitContext<'_>) -> &str {
        self.scratch.clear();
        for step in emission_steps(ctx.kind, self.version) {
            self.emit(*step, ctx);
        }
        &self.scratch
    }

    fn emit(&mut self, step: EmitStep, ctx: &EmitContext<'_>) {
        let params = ctx.params;
        match step {
            EmitStep::Type => self.emit_type(ctx),
            EmitStep::ValueType => {
                if let Some(value_type) = ctx.value_type
                    && value_type != ctx.kind.default_value_type(self.version)
                {
                    self.push_raw(param_names::VALUE, value_type.as_str(self.version));
                }
            }
            EmitStep::Preference => {
                let pref = params.preference();
                if pref < PREF_UNSET {
                    self.push_raw(param_names::PREF, &pref.to_string());
                }
            }
            EmitStep::Index => {
                if let Some(index) = params.index
                    && index < u32::from(PREF_UNSET)
                {
                    self.push_raw(param_names::INDEX, &index.to_string());
                }
            }
            EmitStep::AltId => self.push_single(param_names::ALTID, ctx.alt_id),
            EmitStep::Pid => self.push_list(param_names::PID, &params.pid),
            EmitStep::Language => self.push_single(param_names::LANGUAGE, params.language.as_deref()),
            EmitStep::MediaType => self.push_single(param_names::MEDIATYPE, ctx.media_type),
            EmitStep::Label => self.push_single(param_names::LABEL, params.label.as_deref()),
            EmitStep::Geo => self.push_single(param_names::GEO, params.geo.as_deref()),
            EmitStep::TimeZone => self.push_single(param_names::TZ, params.tz.as_deref()),
            EmitStep::SortAs => self.push_list(param_names::SORT_AS, &params.sort_as),
            EmitStep::CalendarScale => {
                self.push_single(param_names::CALSCALE, params.calscale.as_deref());
            }
            EmitStep::Level => self.push_single(param_names::LEVEL, params.level.as_deref()),
            EmitStep::Context => self.push_single(param_names::CONTEXT, params.context.as_deref()),
            EmitStep::Encoding => {
                if let Some(token) = ctx.encoding.as_param(self.version) {
                    self.push_raw(param_names::ENCODING, token);
                }
            }
            EmitStep::Charset => self.push_single(param_names::CHARSET, ctx.charset),
            EmitStep::NonStandard => {
                if self.write_non_standard {
                    for (name, value) in &params.non_standard {
                        self.push_single(name, Some(value));
                    }
                }
            }
        }
    }

    /// Merges usage, kind flags, free labels and (2.1/3.0) the preference
    /// marker and binary subtype into one `TYPE`.
    fn emit_type(&mut self, ctx: &EmitContext<'_>) {
        let version = self.version;
        let mut labels = ctx.params.type_labels(ctx.kind, version);

        if !matches!(version, VCardVersion::V4_0) {
            if ctx.kind.shape(version) == ValueShape::Binary
                && let Some(media_type) = ctx.media_type
            {
                let subtype = media_type.split_once('/').map_or(media_type, |(_, sub)| sub);
                if !subtype.is_empty() {
                    labels.insert(0, subtype.to_string());
                }
            }
            if ctx.is_preferred && ctx.kind.marks_preference() {
                labels.push("pref".to_string());
            }
        }
        if labels.is_empty() {
            return;
        }

        match version {
            VCardVersion::V2_1 => {
                for label in &labels {
                    self.push_single(param_names::TYPE, Some(&label.to_ascii_uppercase()));
                }
            }
            VCardVersion::V3_0 => {
                let upper: Vec<String> = labels.iter().map(|l| l.to_ascii_uppercase()).collect();
                self.push_list(param_names::TYPE, &upper);
            }
            VCardVersion::V4_0 => self.push_list(param_names::TYPE, &labels),
        }
    }

    fn push_raw(&mut self, name: &str, value: &str) {
        self.scratch.push(';');
        self.scratch.push_str(name);
        self.scratch.push('=');
        self.scratch.push_str(value);
    }

    fn push_single(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.scratch.push(';');
            self.scratch.push_str(name);
            self.scratch.push('=');
            self.push_value(value);
        }
    }

    fn push_list(&mut self, name: &str, values: &[String]) {
        if values.is_empty() {
            return;
        }
        self.scratch.push(';');
        self.scratch.push_str(name);
        self.scratch.push('=');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.scratch.push(',');
            }
            self.push_value(value);
        }
    }

    /// Writes one parameter value in the grammar of the version.
    ///
    /// Embedded quotes are dropped. 4.0 caret-escapes `^` and line breaks and
    /// quotes values holding `,` `;` or `:`. 2.1/3.0 cannot quote, so `;` and
    /// `:` are dropped there.
    fn push_value(&mut self, value: &str) {
        let value: Cow<'_, str> = if value.contains('"') {
            Cow::Owned(value.replace('"', ""))
        } else {
            Cow::Borrowed(value)
        };

        match self.version {
            VCardVersion::V4_0 => {
                let quote = value.contains([',', ';', ':']);
                if quote {
                    self.scratch.push('"');
                }
                let mut chars = value.chars().peekable();
                while let Some(c) = chars.next() {
                    match c {
                        '^' => self.scratch.push_str("^^"),
                        '\n' => self.scratch.push_str("^n"),
                        '\r' => {
                            if chars.peek() == Some(&'\n') {
                                chars.next();
                            }
                            self.scratch.push_str("^n");
                        }
                        _ => self.scratch.push(c),
                    }
                }
                if quote {
                    self.scratch.push('"');
                }
            }
            VCardVersion::V3_0 => {
                let masked = mask_parameter_value(&value, self.version);
                self.scratch
                    .extend(masked.chars().filter(|c| !matches!(c, ';' | ':')));
            }
            VCardVersion::V2_1 => {
                self.scratch.extend(value.chars().filter_map(|c| match c {
                    ';' | ':' => None,
                    '\r' | '\n' => Some(' '),
                    _ => Some(c),
                }));
            }
        }
    }
}

/// Serializes a parameter set with a throwaway session.
#[must_use]
pub fn serialize_parameters(
    params: &ParameterSet,
    kind: PropertyKind,
    version: VCardVersion,
    is_preferred: bool,
) -> String {
    let ctx = EmitContext::new(params, kind).preferred(is_preferred);
    ParameterSerializer::new(version).serialize(&ctx).to_string()
}
