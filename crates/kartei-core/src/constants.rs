/// Record framing constants shared across crates
pub const CRLF: &str = "\r\n";

pub const VCARD_COMPONENT: &str = "VCARD";
pub const BEGIN_VCARD: &str = const_str::concat!("BEGIN:", VCARD_COMPONENT);
pub const END_VCARD: &str = const_str::concat!("END:", VCARD_COMPONENT);

/// Content octets per physical line, excluding the CRLF.
pub const DEFAULT_LINE_BUDGET: usize = 75;

/// Version token used when no target version is configured.
pub const DEFAULT_VERSION: &str = "4.0";

/// Charset declared for quoted-printable output.
pub const DEFAULT_CHARSET: &str = "UTF-8";
