//! vCard 2.1 / 3.0 / 4.0 codec.
//!
//! See [`rfc::vcard`] for the content-line parser and serializer.

pub mod error;
pub mod rfc;
