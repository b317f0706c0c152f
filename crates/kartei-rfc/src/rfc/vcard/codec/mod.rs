//! Leaf codecs shared by the parser and the writer.
//!
//! - [`mask`]: version-gated backslash escaping
//! - [`quoted_printable`]: charset-aware quoted-printable
//! - [`base64`]: payload wrapping for embedded binaries
//! - [`data_url`]: `data:` URLs for 4.0 binaries

pub mod base64;
pub mod data_url;
pub mod mask;
pub mod quoted_printable;
