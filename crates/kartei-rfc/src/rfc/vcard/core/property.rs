//! vCard property types.

use super::kind::PropertyKind;
use super::parameter_set::ParameterSet;
use super::value::VCardValue;

/// One property of a card: `[group.]NAME;params:value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardProperty {
    /// Optional property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (normalized to uppercase).
    pub name: String,
    pub params: ParameterSet,
    pub value: VCardValue,
}

impl VCardProperty {
    /// Creates a property with empty parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<VCardValue>) -> Self {
        Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            params: ParameterSet::default(),
            value: value.into(),
        }
    }

    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, VCardValue::Text(value.into()))
    }

    /// Creates a property with a URI value.
    #[must_use]
    pub fn uri(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, VCardValue::Uri(value.into()))
    }

    /// Sets the group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Replaces the parameters.
    #[must_use]
    pub fn with_params(mut self, params: ParameterSet) -> Self {
        self.params = params;
        self
    }

    /// Sets the preference (clamped to `1..=100`).
    #[must_use]
    pub fn with_preference(mut self, pref: u8) -> Self {
        self.params.set_preference(pref);
        self
    }

    /// Returns the property kind resolved from the name.
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        PropertyKind::from_name(&self.name)
    }

    /// Returns the value as text if applicable.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }
}
