//! vCard parsing (2.1, 3.0, 4.0).
//!
//! ## Usage
//!
//! ```rust
//! use kartei_rfc::rfc::vcard::parse;
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:3.0\r\n\
//! FN:Bodo\\, der Blöde\r\n\
//! END:VCARD\r\n";
//!
//! let cards = parse::parse(input).unwrap();
//! assert_eq!(cards[0].formatted_name(), Some("Bodo, der Blöde"));
//! ```
//!
//! ## Features
//!
//! - Handles line folding and quoted-printable soft breaks
//! - Parses property groups (item1.TEL) and 2.1 bare parameters
//! - Decodes structured, list, date, timestamp and embedded binary values
//! - RFC 6868 caret encoding for 4.0 parameters
//! - Collects row-level problems as diagnostics instead of failing

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{ContentRow, LogicalLine, Unfolder, parse_row, parse_row_at, unfold};
pub use parser::{ReadOptions, VcfReader, parse, parse_single};
pub use values::{decode_property, split_list, split_structured};
