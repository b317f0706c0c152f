//! Flag-style `TYPE` vocabularies.
//!
//! Each vocabulary assigns its labels to a contiguous bit range. Serializers
//! walk the range from `MIN_BIT` to `MAX_BIT` and skip bits that have no label
//! in the target version, so emission order is the bit order.

use std::fmt;
use std::marker::PhantomData;

use super::version::VCardVersion;

/// A closed set of `TYPE` labels mapped onto bit positions.
pub trait FlagVocabulary {
    /// Lowest bit in use.
    const MIN_BIT: u32;
    /// Highest bit in use.
    const MAX_BIT: u32;

    /// Returns the label for `bit` in `version`, or `None` if the bit is
    /// undefined there.
    fn label(bit: u32, version: VCardVersion) -> Option<&'static str>;

    /// Looks up a label in any version (case-insensitive).
    fn bit_for(label: &str) -> Option<u32> {
        (Self::MIN_BIT..=Self::MAX_BIT).find(|&bit| {
            [VCardVersion::V2_1, VCardVersion::V3_0, VCardVersion::V4_0]
                .into_iter()
                .filter_map(|version| Self::label(bit, version))
                .any(|known| known.eq_ignore_ascii_case(label))
        })
    }
}

/// A set of flags from one vocabulary.
pub struct TypeFlags<V> {
    bits: u32,
    vocabulary: PhantomData<V>,
}

impl<V: FlagVocabulary> TypeFlags<V> {
    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            bits: 0,
            vocabulary: PhantomData,
        }
    }

    /// Returns whether no flag is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Sets the flag at `bit`. Bits outside the vocabulary range are ignored.
    pub fn insert(&mut self, bit: u32) {
        if (V::MIN_BIT..=V::MAX_BIT).contains(&bit) {
            self.bits |= 1 << bit;
        }
    }

    /// Returns whether the flag at `bit` is set.
    #[must_use]
    pub const fn contains(&self, bit: u32) -> bool {
        bit < u32::BITS && self.bits & (1 << bit) != 0
    }

    /// Sets the flag named `label`; returns `false` if the vocabulary does not
    /// know the label.
    pub fn insert_label(&mut self, label: &str) -> bool {
        match V::bit_for(label) {
            Some(bit) => {
                self.insert(bit);
                true
            }
            None => false,
        }
    }

    /// Returns whether the flag named `label` is set.
    #[must_use]
    pub fn contains_label(&self, label: &str) -> bool {
        V::bit_for(label).is_some_and(|bit| self.contains(bit))
    }

    /// Labels of the set flags that exist in `version`, in bit order.
    pub fn labels(&self, version: VCardVersion) -> impl Iterator<Item = &'static str> + '_ {
        (V::MIN_BIT..=V::MAX_BIT)
            .filter(|&bit| self.contains(bit))
            .filter_map(move |bit| V::label(bit, version))
    }
}

impl<V> Clone for TypeFlags<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for TypeFlags<V> {}

impl<V> PartialEq for TypeFlags<V> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<V> Eq for TypeFlags<V> {}

impl<V: FlagVocabulary> Default for TypeFlags<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> fmt::Debug for TypeFlags<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeFlags({:#b})", self.bits)
    }
}

/// `home` / `work`, valid on every property that takes a TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {}

impl Usage {
    pub const HOME: u32 = 0;
    pub const WORK: u32 = 1;
}

impl FlagVocabulary for Usage {
    const MIN_BIT: u32 = 0;
    const MAX_BIT: u32 = 1;

    fn label(bit: u32, _version: VCardVersion) -> Option<&'static str> {
        match bit {
            Self::HOME => Some("home"),
            Self::WORK => Some("work"),
            _ => None,
        }
    }
}

/// Delivery address kinds (`ADR`, `LABEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {}

impl AddressKind {
    pub const DOM: u32 = 0;
    pub const INTL: u32 = 1;
    pub const POSTAL: u32 = 2;
    pub const PARCEL: u32 = 3;
}

impl FlagVocabulary for AddressKind {
    const MIN_BIT: u32 = 0;
    const MAX_BIT: u32 = 3;

    fn label(bit: u32, version: VCardVersion) -> Option<&'static str> {
        if matches!(version, VCardVersion::V4_0) {
            return None;
        }
        match bit {
            Self::DOM => Some("dom"),
            Self::INTL => Some("intl"),
            Self::POSTAL => Some("postal"),
            Self::PARCEL => Some("parcel"),
            _ => None,
        }
    }
}

/// Telephone kinds (`TEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneKind {}

impl PhoneKind {
    pub const VOICE: u32 = 0;
    pub const FAX: u32 = 1;
    pub const MSG: u32 = 2;
    pub const CELL: u32 = 3;
    pub const PAGER: u32 = 4;
    pub const BBS: u32 = 5;
    pub const MODEM: u32 = 6;
    pub const CAR: u32 = 7;
    pub const ISDN: u32 = 8;
    pub const VIDEO: u32 = 9;
    pub const PCS: u32 = 10;
    pub const TEXT: u32 = 11;
    pub const TEXTPHONE: u32 = 12;
}

impl FlagVocabulary for PhoneKind {
    const MIN_BIT: u32 = 0;
    const MAX_BIT: u32 = 12;

    fn label(bit: u32, version: VCardVersion) -> Option<&'static str> {
        let v4 = matches!(version, VCardVersion::V4_0);
        match bit {
            Self::VOICE => Some("voice"),
            Self::FAX => Some("fax"),
            Self::CELL => Some("cell"),
            Self::PAGER => Some("pager"),
            Self::VIDEO => Some("video"),
            Self::MSG if !v4 => Some("msg"),
            Self::BBS if !v4 => Some("bbs"),
            Self::MODEM if !v4 => Some("modem"),
            Self::CAR if !v4 => Some("car"),
            Self::ISDN if !v4 => Some("isdn"),
            Self::PCS if matches!(version, VCardVersion::V3_0) => Some("pcs"),
            Self::TEXT if v4 => Some("text"),
            Self::TEXTPHONE if v4 => Some("textphone"),
            _ => None,
        }
    }
}

/// E-mail address kinds (`EMAIL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {}

impl EmailKind {
    pub const INTERNET: u32 = 0;
    pub const X400: u32 = 1;
    pub const AOL: u32 = 2;
    pub const APPLELINK: u32 = 3;
    pub const ATTMAIL: u32 = 4;
    pub const CIS: u32 = 5;
    pub const EWORLD: u32 = 6;
    pub const IBMMAIL: u32 = 7;
    pub const MCIMAIL: u32 = 8;
    pub const POWERSHARE: u32 = 9;
    pub const PRODIGY: u32 = 10;
    pub const TLX: u32 = 11;
}

impl FlagVocabulary for EmailKind {
    const MIN_BIT: u32 = 0;
    const MAX_BIT: u32 = 11;

    fn label(bit: u32, version: VCardVersion) -> Option<&'static str> {
        match (bit, version) {
            (_, VCardVersion::V4_0) => None,
            (Self::INTERNET, _) => Some("internet"),
            (Self::X400, _) => Some("x400"),
            (_, VCardVersion::V3_0) => None,
            (Self::AOL, _) => Some("aol"),
            (Self::APPLELINK, _) => Some("applelink"),
            (Self::ATTMAIL, _) => Some("attmail"),
            (Self::CIS, _) => Some("cis"),
            (Self::EWORLD, _) => Some("eworld"),
            (Self::IBMMAIL, _) => Some("ibmmail"),
            (Self::MCIMAIL, _) => Some("mcimail"),
            (Self::POWERSHARE, _) => Some("powershare"),
            (Self::PRODIGY, _) => Some("prodigy"),
            (Self::TLX, _) => Some("tlx"),
            _ => None,
        }
    }
}

/// Relationship kinds (`RELATED`, 4.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {}

impl RelationKind {
    pub const CONTACT: u32 = 0;
    pub const ACQUAINTANCE: u32 = 1;
    pub const FRIEND: u32 = 2;
    pub const MET: u32 = 3;
    pub const CO_WORKER: u32 = 4;
    pub const COLLEAGUE: u32 = 5;
    pub const CO_RESIDENT: u32 = 6;
    pub const NEIGHBOR: u32 = 7;
    pub const CHILD: u32 = 8;
    pub const PARENT: u32 = 9;
    pub const SIBLING: u32 = 10;
    pub const SPOUSE: u32 = 11;
    pub const KIN: u32 = 12;
    pub const MUSE: u32 = 13;
    pub const CRUSH: u32 = 14;
    pub const DATE: u32 = 15;
    pub const SWEETHEART: u32 = 16;
    pub const ME: u32 = 17;
    pub const AGENT: u32 = 18;
    pub const EMERGENCY: u32 = 19;
}

const RELATION_LABELS: [&str; 20] = [
    "contact",
    "acquaintance",
    "friend",
    "met",
    "co-worker",
    "colleague",
    "co-resident",
    "neighbor",
    "child",
    "parent",
    "sibling",
    "spouse",
    "kin",
    "muse",
    "crush",
    "date",
    "sweetheart",
    "me",
    "agent",
    "emergency",
];

impl FlagVocabulary for RelationKind {
    const MIN_BIT: u32 = 0;
    const MAX_BIT: u32 = 19;

    fn label(bit: u32, _version: VCardVersion) -> Option<&'static str> {
        usize::try_from(bit)
            .ok()
            .and_then(|index| RELATION_LABELS.get(index))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_bit_order() {
        let mut flags = TypeFlags::<PhoneKind>::empty();
        flags.insert(PhoneKind::CELL);
        flags.insert(PhoneKind::VOICE);
        let labels: Vec<_> = flags.labels(VCardVersion::V3_0).collect();
        assert_eq!(labels, vec!["voice", "cell"]);
    }

    #[test]
    fn undefined_bits_are_skipped_per_version() {
        let mut flags = TypeFlags::<PhoneKind>::empty();
        flags.insert(PhoneKind::MODEM);
        flags.insert(PhoneKind::TEXT);
        assert_eq!(flags.labels(VCardVersion::V3_0).collect::<Vec<_>>(), vec!["modem"]);
        assert_eq!(flags.labels(VCardVersion::V4_0).collect::<Vec<_>>(), vec!["text"]);
    }

    #[test]
    fn insert_label_is_case_insensitive() {
        let mut flags = TypeFlags::<AddressKind>::empty();
        assert!(flags.insert_label("POSTAL"));
        assert!(!flags.insert_label("spaceship"));
        assert!(flags.contains(AddressKind::POSTAL));
        assert!(flags.contains_label("postal"));
        assert!(flags.labels(VCardVersion::V4_0).next().is_none());
    }

    #[test]
    fn bits_outside_range_are_ignored() {
        let mut flags = TypeFlags::<Usage>::empty();
        flags.insert(7);
        assert!(flags.is_empty());
    }

    #[test]
    fn relation_labels() {
        let mut flags = TypeFlags::<RelationKind>::empty();
        assert!(flags.insert_label("Spouse"));
        assert!(flags.insert_label("co-worker"));
        let labels: Vec<_> = flags.labels(VCardVersion::V4_0).collect();
        assert_eq!(labels, vec!["co-worker", "spouse"]);
    }
}
