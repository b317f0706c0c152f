use thiserror::Error;

use crate::rfc::vcard::parse::ParseError;

/// Codec-level errors surfaced to callers
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unsupported vCard version: {0}")]
    UnsupportedVersion(String),

    #[error(transparent)]
    CoreError(#[from] kartei_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
