//! vCard codec (RFC 2426, RFC 6350 and the vCard 2.1 specification).
//!
//! ## Overview
//!
//! vCard is a line-oriented text format for contact records. Versions 2.1,
//! 3.0 and 4.0 share the `[group.]NAME;PARAM=VALUE:value` grammar but differ in
//! escaping, transport encodings, parameter vocabulary and default value
//! types. This module reads all three and writes any of them.
//!
//! ## Usage
//!
//! ### Parsing
//!
//! ```rust
//! use kartei_rfc::rfc::vcard::{parse, VCard};
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:4.0\r\n\
//! FN:John Doe\r\n\
//! EMAIL:john@example.com\r\n\
//! END:VCARD\r\n";
//!
//! let cards = parse(input).unwrap();
//! assert_eq!(cards[0].formatted_name(), Some("John Doe"));
//! ```
//!
//! ### Serializing
//!
//! ```rust
//! use kartei_rfc::rfc::vcard::{VCard, VCardProperty, VCardVersion, WriterOptions, serialize_as};
//!
//! let mut card = VCard::new();
//! card.add_property(VCardProperty::text("FN", "Bodo, der Blöde"));
//!
//! let output = serialize_as(&[card], VCardVersion::V3_0, &WriterOptions::default());
//! assert!(output.contains("FN:Bodo\\, der Blöde\r\n"));
//! ```
//!
//! ## Round-Trip Fidelity
//!
//! Parsing a card and writing it back in the same version keeps every
//! property the version can carry. Writing to an older version drops what it
//! cannot express; properties are always emitted in canonical kind order.
//!
//! ## Submodules
//!
//! - [`core`] - Data model (`VCard`, `VCardProperty`, `ParameterSet`, ...)
//! - [`codec`] - Masking, quoted-printable, Base64 and data URLs
//! - [`parse`] - Unfolding, row parsing, value decoding and the record reader
//! - [`build`] - Folding, parameter emission and the writer

pub mod build;
pub mod codec;
pub mod core;
pub mod parse;

#[cfg(test)]
mod tests;

pub use build::{VcfWriter, WriterOptions, serialize, serialize_as, serialize_property};
pub use core::{
    DateAndOrTime, ParameterSet, PropertyKind, TransportEncoding, VCard, VCardParameter,
    VCardProperty, VCardValue, VCardVersion, ValueType,
};
pub use parse::{
    ContentRow, ParseError, ParseErrorKind, ParseResult, ReadOptions, VcfReader, parse,
    parse_row, parse_single,
};
