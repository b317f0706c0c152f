//! Property kinds and their per-version rules.
//!
//! The declaration order of [`PropertyKind`] is the canonical emission order
//! used by the writer for every version.

use super::version::VCardVersion;

/// Known vCard property keys, in canonical emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    Profile,
    Kind,
    Source,
    Name,
    FormattedName,
    StructuredName,
    Nickname,
    SortString,
    Photo,
    Birthday,
    BirthPlace,
    DeathDate,
    DeathPlace,
    Anniversary,
    Gender,
    GramGender,
    Pronouns,
    Address,
    Label,
    Telephone,
    Email,
    Mailer,
    Impp,
    Language,
    TimeZone,
    Geo,
    Title,
    Role,
    Logo,
    Agent,
    Organization,
    OrgDirectory,
    Member,
    Related,
    Expertise,
    Hobby,
    Interest,
    Categories,
    Note,
    ProdId,
    Created,
    Revision,
    Sound,
    Uid,
    ClientPidMap,
    Url,
    SocialProfile,
    ContactUri,
    Class,
    Key,
    FreeBusyUrl,
    CalendarAddressUri,
    CalendarUri,
    Xml,
    /// Any `X-` or otherwise unknown key; the property keeps its own name.
    NonStandard,
}

/// How a raw value is split and decoded for a property kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    List,
    Structured,
    DateAndOrTime,
    Timestamp,
    Binary,
    Uri,
}

const KEYS: &[(PropertyKind, &str)] = &[
    (PropertyKind::Profile, "PROFILE"),
    (PropertyKind::Kind, "KIND"),
    (PropertyKind::Source, "SOURCE"),
    (PropertyKind::Name, "NAME"),
    (PropertyKind::FormattedName, "FN"),
    (PropertyKind::StructuredName, "N"),
    (PropertyKind::Nickname, "NICKNAME"),
    (PropertyKind::SortString, "SORT-STRING"),
    (PropertyKind::Photo, "PHOTO"),
    (PropertyKind::Birthday, "BDAY"),
    (PropertyKind::BirthPlace, "BIRTHPLACE"),
    (PropertyKind::DeathDate, "DEATHDATE"),
    (PropertyKind::DeathPlace, "DEATHPLACE"),
    (PropertyKind::Anniversary, "ANNIVERSARY"),
    (PropertyKind::Gender, "GENDER"),
    (PropertyKind::GramGender, "GRAMGENDER"),
    (PropertyKind::Pronouns, "PRONOUNS"),
    (PropertyKind::Address, "ADR"),
    (PropertyKind::Label, "LABEL"),
    (PropertyKind::Telephone, "TEL"),
    (PropertyKind::Email, "EMAIL"),
    (PropertyKind::Mailer, "MAILER"),
    (PropertyKind::Impp, "IMPP"),
    (PropertyKind::Language, "LANG"),
    (PropertyKind::TimeZone, "TZ"),
    (PropertyKind::Geo, "GEO"),
    (PropertyKind::Title, "TITLE"),
    (PropertyKind::Role, "ROLE"),
    (PropertyKind::Logo, "LOGO"),
    (PropertyKind::Agent, "AGENT"),
    (PropertyKind::Organization, "ORG"),
    (PropertyKind::OrgDirectory, "ORG-DIRECTORY"),
    (PropertyKind::Member, "MEMBER"),
    (PropertyKind::Related, "RELATED"),
    (PropertyKind::Expertise, "EXPERTISE"),
    (PropertyKind::Hobby, "HOBBY"),
    (PropertyKind::Interest, "INTEREST"),
    (PropertyKind::Categories, "CATEGORIES"),
    (PropertyKind::Note, "NOTE"),
    (PropertyKind::ProdId, "PRODID"),
    (PropertyKind::Created, "CREATED"),
    (PropertyKind::Revision, "REV"),
    (PropertyKind::Sound, "SOUND"),
    (PropertyKind::Uid, "UID"),
    (PropertyKind::ClientPidMap, "CLIENTPIDMAP"),
    (PropertyKind::Url, "URL"),
    (PropertyKind::SocialProfile, "SOCIALPROFILE"),
    (PropertyKind::ContactUri, "CONTACT-URI"),
    (PropertyKind::Class, "CLASS"),
    (PropertyKind::Key, "KEY"),
    (PropertyKind::FreeBusyUrl, "FBURL"),
    (PropertyKind::CalendarAddressUri, "CALADRURI"),
    (PropertyKind::CalendarUri, "CALURI"),
    (PropertyKind::Xml, "XML"),
];

impl PropertyKind {
    /// Resolves a property key (case-insensitive).
    ///
    /// Unknown keys resolve to [`PropertyKind::NonStandard`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        KEYS.iter()
            .find(|(_, key)| key.eq_ignore_ascii_case(name))
            .map_or(Self::NonStandard, |(kind, _)| *kind)
    }

    /// Returns the canonical key, or `None` for non-standard properties.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        KEYS.iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, key)| *key)
    }

    /// Whether the property exists in `version`.
    #[must_use]
    pub const fn is_supported(self, version: VCardVersion) -> bool {
        use VCardVersion::{V2_1, V3_0, V4_0};

        match self {
            Self::FormattedName
            | Self::StructuredName
            | Self::Photo
            | Self::Birthday
            | Self::Address
            | Self::Telephone
            | Self::Email
            | Self::TimeZone
            | Self::Geo
            | Self::Title
            | Self::Role
            | Self::Logo
            | Self::Organization
            | Self::Note
            | Self::Revision
            | Self::Sound
            | Self::Uid
            | Self::Url
            | Self::Key
            | Self::NonStandard => true,
            Self::Label | Self::Mailer | Self::Agent => matches!(version, V2_1 | V3_0),
            Self::Profile | Self::Name | Self::SortString | Self::Class => {
                matches!(version, V3_0)
            }
            Self::Source
            | Self::Nickname
            | Self::Categories
            | Self::ProdId
            | Self::Impp
            | Self::FreeBusyUrl
            | Self::CalendarAddressUri
            | Self::CalendarUri => matches!(version, V3_0 | V4_0),
            Self::Kind
            | Self::BirthPlace
            | Self::DeathDate
            | Self::DeathPlace
            | Self::Anniversary
            | Self::Gender
            | Self::GramGender
            | Self::Pronouns
            | Self::Language
            | Self::OrgDirectory
            | Self::Member
            | Self::Related
            | Self::Expertise
            | Self::Hobby
            | Self::Interest
            | Self::Created
            | Self::ClientPidMap
            | Self::SocialProfile
            | Self::ContactUri
            | Self::Xml => matches!(version, V4_0),
        }
    }

    /// Whether several physical occurrences may be written in `version`.
    ///
    /// 4.0 allows repetition of every property; in 2.1/3.0 only the listed
    /// communication and address properties repeat.
    #[must_use]
    pub const fn allows_multiple(self, version: VCardVersion) -> bool {
        match version {
            VCardVersion::V4_0 => true,
            VCardVersion::V2_1 | VCardVersion::V3_0 => matches!(
                self,
                Self::Address
                    | Self::Label
                    | Self::Telephone
                    | Self::Email
                    | Self::Impp
                    | Self::Url
                    | Self::Key
                    | Self::FreeBusyUrl
                    | Self::CalendarAddressUri
                    | Self::CalendarUri
                    | Self::NonStandard
            ),
        }
    }

    /// Whether repeated 4.0 instances denote one value in alternative
    /// representations and therefore share an `ALTID`.
    #[must_use]
    pub const fn groups_alternatives(self) -> bool {
        matches!(
            self,
            Self::StructuredName
                | Self::Birthday
                | Self::Anniversary
                | Self::BirthPlace
                | Self::DeathPlace
                | Self::DeathDate
        )
    }

    /// Whether a preferred instance is marked with `TYPE=PREF` in 2.1/3.0.
    #[must_use]
    pub const fn marks_preference(self) -> bool {
        matches!(
            self,
            Self::Address | Self::Label | Self::Telephone | Self::Email | Self::Impp
        )
    }

    /// How the raw value is decoded in `version`.
    #[must_use]
    pub const fn shape(self, version: VCardVersion) -> ValueShape {
        match self {
            Self::StructuredName
            | Self::Address
            | Self::Organization
            | Self::Gender
            | Self::ClientPidMap => ValueShape::Structured,
            Self::Geo if !matches!(version, VCardVersion::V4_0) => ValueShape::Structured,
            Self::Nickname | Self::Categories => ValueShape::List,
            Self::Birthday | Self::Anniversary | Self::DeathDate => ValueShape::DateAndOrTime,
            Self::Revision | Self::Created => ValueShape::Timestamp,
            Self::Photo | Self::Logo | Self::Sound | Self::Key => ValueShape::Binary,
            Self::Url
            | Self::Source
            | Self::Impp
            | Self::Member
            | Self::FreeBusyUrl
            | Self::CalendarAddressUri
            | Self::CalendarUri
            | Self::OrgDirectory
            | Self::ContactUri
            | Self::SocialProfile
            | Self::Geo => ValueShape::Uri,
            Self::Related if matches!(version, VCardVersion::V4_0) => ValueShape::Uri,
            _ => ValueShape::Text,
        }
    }

    /// The value type a reader assumes when no `VALUE` parameter is present.
    #[must_use]
    pub const fn default_value_type(self, version: VCardVersion) -> ValueType {
        let v4 = matches!(version, VCardVersion::V4_0);
        match self.shape(version) {
            ValueShape::Binary if v4 => ValueType::Uri,
            ValueShape::Binary => ValueType::Binary,
            ValueShape::Uri => ValueType::Uri,
            ValueShape::DateAndOrTime if v4 => ValueType::DateAndOrTime,
            ValueShape::DateAndOrTime => ValueType::Date,
            ValueShape::Timestamp => ValueType::Timestamp,
            ValueShape::Text | ValueShape::List | ValueShape::Structured => match self {
                Self::TimeZone if !v4 => ValueType::UtcOffset,
                _ => ValueType::Text,
            },
        }
    }
}

/// Value types named by the `VALUE` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    Uri,
    Date,
    Time,
    DateTime,
    DateAndOrTime,
    Timestamp,
    UtcOffset,
    Binary,
    Boolean,
    Integer,
    Float,
    LanguageTag,
    VCard,
    ContentId,
}

impl ValueType {
    /// Parses a `VALUE` parameter token (case-insensitive, all versions).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let lower = token.trim().to_ascii_lowercase();
        let value_type = match lower.as_str() {
            "text" => Self::Text,
            "uri" | "url" => Self::Uri,
            "date" => Self::Date,
            "time" => Self::Time,
            "date-time" => Self::DateTime,
            "date-and-or-time" => Self::DateAndOrTime,
            "timestamp" => Self::Timestamp,
            "utc-offset" => Self::UtcOffset,
            "binary" | "inline" => Self::Binary,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "language-tag" => Self::LanguageTag,
            "vcard" => Self::VCard,
            "content-id" | "cid" => Self::ContentId,
            _ => return None,
        };
        Some(value_type)
    }

    /// Returns the spelling used by `version`.
    #[must_use]
    pub const fn as_str(self, version: VCardVersion) -> &'static str {
        if matches!(version, VCardVersion::V2_1) {
            return match self {
                Self::Uri => "URL",
                Self::Binary => "INLINE",
                Self::ContentId => "CONTENT-ID",
                Self::Date => "DATE",
                Self::DateTime | Self::DateAndOrTime | Self::Timestamp => "DATE-TIME",
                Self::VCard => "VCARD",
                _ => "TEXT",
            };
        }
        match self {
            Self::Text => "text",
            Self::Uri => "uri",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::DateAndOrTime => "date-and-or-time",
            Self::Timestamp => "timestamp",
            Self::UtcOffset => "utc-offset",
            Self::Binary => "binary",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::LanguageTag => "language-tag",
            Self::VCard => "vcard",
            Self::ContentId => "content-id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_keys_case_insensitively() {
        assert_eq!(PropertyKind::from_name("fn"), PropertyKind::FormattedName);
        assert_eq!(PropertyKind::from_name("ADR"), PropertyKind::Address);
        assert_eq!(PropertyKind::from_name("X-FOO"), PropertyKind::NonStandard);
        assert_eq!(PropertyKind::Telephone.name(), Some("TEL"));
        assert_eq!(PropertyKind::NonStandard.name(), None);
    }

    #[test]
    fn every_key_round_trips() {
        for (kind, key) in KEYS {
            assert_eq!(PropertyKind::from_name(key), *kind);
            assert_eq!(kind.name(), Some(*key));
        }
    }

    #[test]
    fn canonical_order_follows_declaration() {
        assert!(PropertyKind::FormattedName < PropertyKind::StructuredName);
        assert!(PropertyKind::Telephone < PropertyKind::Email);
        assert!(PropertyKind::Xml < PropertyKind::NonStandard);
    }

    #[test]
    fn version_support_table() {
        assert!(!PropertyKind::Gender.is_supported(VCardVersion::V3_0));
        assert!(PropertyKind::Gender.is_supported(VCardVersion::V4_0));
        assert!(PropertyKind::Label.is_supported(VCardVersion::V2_1));
        assert!(!PropertyKind::Label.is_supported(VCardVersion::V4_0));
        assert!(!PropertyKind::Nickname.is_supported(VCardVersion::V2_1));
        assert!(PropertyKind::SortString.is_supported(VCardVersion::V3_0));
    }

    #[test]
    fn cardinality_per_version() {
        assert!(!PropertyKind::Note.allows_multiple(VCardVersion::V3_0));
        assert!(PropertyKind::Telephone.allows_multiple(VCardVersion::V2_1));
        assert!(PropertyKind::Note.allows_multiple(VCardVersion::V4_0));
    }

    #[test]
    fn default_value_types() {
        assert_eq!(
            PropertyKind::Photo.default_value_type(VCardVersion::V4_0),
            ValueType::Uri
        );
        assert_eq!(
            PropertyKind::Birthday.default_value_type(VCardVersion::V3_0),
            ValueType::Date
        );
        assert_eq!(
            PropertyKind::TimeZone.default_value_type(VCardVersion::V3_0),
            ValueType::UtcOffset
        );
        assert_eq!(
            PropertyKind::Related.default_value_type(VCardVersion::V4_0),
            ValueType::Uri
        );
    }

    #[test]
    fn value_type_spelling() {
        assert_eq!(ValueType::Uri.as_str(VCardVersion::V2_1), "URL");
        assert_eq!(ValueType::Uri.as_str(VCardVersion::V3_0), "uri");
        assert_eq!(ValueType::parse("CID"), Some(ValueType::ContentId));
        assert_eq!(ValueType::parse("phone-number"), None);
    }
}
