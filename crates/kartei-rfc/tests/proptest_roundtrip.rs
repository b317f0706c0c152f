//! Property-based tests for the vCard leaf codecs.
//!
//! Generated text contains no CR, since escaping normalizes line breaks to LF.

use kartei_rfc::rfc::vcard::VCardVersion;
use kartei_rfc::rfc::vcard::build::fold_line;
use kartei_rfc::rfc::vcard::codec::{base64, mask, quoted_printable};
use kartei_rfc::rfc::vcard::parse::unfold;
use proptest::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

fn version_strategy() -> impl Strategy<Value = VCardVersion> {
    prop_oneof![
        Just(VCardVersion::V2_1),
        Just(VCardVersion::V3_0),
        Just(VCardVersion::V4_0),
    ]
}

fn escaping_version_strategy() -> impl Strategy<Value = VCardVersion> {
    prop_oneof![Just(VCardVersion::V3_0), Just(VCardVersion::V4_0)]
}

/// Free text with the characters escaping cares about, and no CR.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\0]{0,200}").expect("valid regex")
}

/// A logical content line: starts with a property name, no line breaks.
fn content_line_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][A-Z0-9]{0,8}:[a-zA-Z0-9 \t=,;:äöüß日本語]{0,300}")
        .expect("valid regex")
}

/// A row declaring quoted-printable: literal characters, blanks, `=XX`
/// escapes and a bare `=` before a blank.
fn quoted_printable_line_strategy() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        prop::string::string_regex("[a-zA-Z0-9,;:.]").expect("valid regex"),
        Just(" ".to_string()),
        Just("\t".to_string()),
        Just("= ".to_string()),
        any::<u8>().prop_map(|b| format!("={b:02X}")),
    ];
    prop::collection::vec(token, 0..120)
        .prop_map(|tokens| format!("NOTE;ENCODING=QUOTED-PRINTABLE:{}", tokens.concat()))
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn mask_then_unmask_is_identity(text in text_strategy(), version in escaping_version_strategy()) {
        let masked = mask::mask(&text, version);
        prop_assert!(!masked.contains('\n'));
        prop_assert_eq!(mask::unmask(&masked, version).into_owned(), text.clone());
    }

    #[test]
    fn quoted_printable_restores_text(text in text_strategy(), start in 0usize..60) {
        let encoded = quoted_printable::encode(&text, Some("UTF-8"), start, 75);
        prop_assert_eq!(quoted_printable::decode(&encoded, Some("UTF-8")), text);
    }

    #[test]
    fn quoted_printable_lines_fit_the_budget(text in text_strategy(), budget in 8usize..120) {
        let encoded = quoted_printable::encode(&text, None, 0, budget);
        for line in encoded.split("\r\n") {
            prop_assert!(line.len() <= budget, "{:?} exceeds {}", line, budget);
            prop_assert!(line.is_ascii());
        }
    }

    #[test]
    fn base64_unwrap_restores_bytes(
        bytes in prop::collection::vec(any::<u8>(), 0..400),
        version in version_strategy(),
    ) {
        let wrapped = base64::wrap(&bytes, version);
        prop_assert_eq!(base64::unwrap(&wrapped).unwrap(), bytes);
    }

    #[test]
    fn folded_lines_unfold_to_the_original(
        line in content_line_strategy(),
        version in version_strategy(),
        budget in 5usize..100,
    ) {
        let folded = fold_line(&line, version, budget);
        for physical in folded.split("\r\n") {
            prop_assert!(physical.len() <= budget, "{:?} exceeds {}", physical, budget);
        }
        prop_assert_eq!(unfold(&folded), vec![line]);
    }

    #[test]
    fn folded_quoted_printable_lines_unfold_to_the_original(
        line in quoted_printable_line_strategy(),
        version in version_strategy(),
        budget in 5usize..100,
    ) {
        let folded = fold_line(&line, version, budget);
        for physical in folded.split("\r\n") {
            prop_assert!(physical.len() <= budget, "{:?} exceeds {}", physical, budget);
        }
        prop_assert_eq!(unfold(&folded), vec![line]);
    }
}
