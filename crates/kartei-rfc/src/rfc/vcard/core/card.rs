//! The vCard record.

use super::kind::PropertyKind;
use super::property::VCardProperty;
use super::version::VCardVersion;

/// One contact record, the content between `BEGIN:VCARD` and `END:VCARD`.
///
/// `BEGIN`, `VERSION` and `END` are not stored as properties; the version is
/// kept in [`VCard::version`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VCard {
    pub version: VCardVersion,
    /// Properties in the order they were read or added.
    pub properties: Vec<VCardProperty>,
}

impl VCard {
    /// Creates an empty 4.0 card.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty card of `version`.
    #[must_use]
    pub fn with_version(version: VCardVersion) -> Self {
        Self {
            version,
            properties: Vec::new(),
        }
    }

    /// Appends a property.
    pub fn add_property(&mut self, property: VCardProperty) {
        self.properties.push(property);
    }

    /// All properties of `kind`, in order.
    pub fn properties_of(&self, kind: PropertyKind) -> impl Iterator<Item = &VCardProperty> {
        self.properties.iter().filter(move |p| p.kind() == kind)
    }

    /// All properties named `name` (case-insensitive), in order.
    pub fn properties_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a VCardProperty> + 'a {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// The first property of `kind`.
    #[must_use]
    pub fn first(&self, kind: PropertyKind) -> Option<&VCardProperty> {
        self.properties_of(kind).next()
    }

    /// Returns the FN value.
    #[must_use]
    pub fn formatted_name(&self) -> Option<&str> {
        self.first(PropertyKind::FormattedName)?.as_text()
    }

    /// Returns the UID value (text or URI).
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        let uid = self.first(PropertyKind::Uid)?;
        uid.value.as_text().or_else(|| uid.value.as_uri())
    }
}
