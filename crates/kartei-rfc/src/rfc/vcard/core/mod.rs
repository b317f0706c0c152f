//! Core vCard types.

mod card;
mod datetime;
mod encoding;
mod kind;
mod parameter;
mod parameter_set;
mod property;
mod type_flags;
mod value;
mod version;

pub use card::VCard;
pub use datetime::{DateAndOrTime, format_timestamp, parse_timestamp};
pub use encoding::TransportEncoding;
pub use kind::{PropertyKind, ValueShape, ValueType};
pub use parameter::{VCardParameter, names as param_names};
pub use parameter_set::{PREF_UNSET, ParameterSet};
pub use property::VCardProperty;
pub use type_flags::{
    AddressKind, EmailKind, FlagVocabulary, PhoneKind, RelationKind, TypeFlags, Usage,
};
pub use value::VCardValue;
pub use version::VCardVersion;
