//! Raw vCard parameters as they appear on a content line.

/// A parameter of a parsed content row.
///
/// Values are kept as written: quoted values still carry their quotes and
/// escapes are not resolved. [`ParameterSet`](super::ParameterSet) interprets
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardParameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter values, split on commas outside quotes.
    pub values: Vec<String>,
}

impl VCardParameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a parameter with multiple values.
    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Returns whether the parameter has the specified value (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    /// Returns whether `name` is one of the standard parameter names of any
    /// version.
    #[must_use]
    pub fn is_standard_name(name: &str) -> bool {
        names::ALL.iter().any(|known| known.eq_ignore_ascii_case(name))
    }
}

/// Standard parameter names.
pub mod names {
    pub const TYPE: &str = "TYPE";
    pub const VALUE: &str = "VALUE";
    pub const ENCODING: &str = "ENCODING";
    pub const CHARSET: &str = "CHARSET";
    pub const LANGUAGE: &str = "LANGUAGE";
    pub const PREF: &str = "PREF";
    pub const ALTID: &str = "ALTID";
    pub const PID: &str = "PID";
    pub const INDEX: &str = "INDEX";
    pub const GEO: &str = "GEO";
    pub const TZ: &str = "TZ";
    pub const MEDIATYPE: &str = "MEDIATYPE";
    pub const LABEL: &str = "LABEL";
    pub const SORT_AS: &str = "SORT-AS";
    pub const CALSCALE: &str = "CALSCALE";
    pub const LEVEL: &str = "LEVEL";
    pub const CONTEXT: &str = "CONTEXT";

    pub const ALL: [&str; 17] = [
        TYPE, VALUE, ENCODING, CHARSET, LANGUAGE, PREF, ALTID, PID, INDEX, GEO, TZ, MEDIATYPE,
        LABEL, SORT_AS, CALSCALE, LEVEL, CONTEXT,
    ];
}
