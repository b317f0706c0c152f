//! vCard line folding.
//!
//! Budgets count UTF-8 octets, not characters, and exclude the CRLF. A fold
//! inserts CRLF plus one space, which counts toward the next line.
//!
//! Line breaks already present in the assembled line (quoted-printable soft
//! breaks, 2.1 Base64 blocks) are kept and restart the count.

use kartei_core::constants::{CRLF, DEFAULT_LINE_BUDGET};

use crate::rfc::vcard::core::VCardVersion;

const FOLD: &str = "\r\n ";

/// Smallest budget that always leaves room for one character after a fold.
pub(super) const MIN_BUDGET: usize = 5;

/// Folds a line at the default budget of 75 octets.
#[must_use]
pub fn fold(line: &str, version: VCardVersion) -> String {
    fold_line(line, version, DEFAULT_LINE_BUDGET)
}

/// Folds a line so every physical line fits in `budget` octets.
///
/// 3.0 and 4.0 fold at the budget on a character boundary. 2.1 prefers to
/// fold before a blank within the current window; without one it splits at the
/// budget but never inside a quoted-printable `=XX` escape.
#[must_use]
pub fn fold_line(line: &str, version: VCardVersion, budget: usize) -> String {
    let budget = budget.max(MIN_BUDGET);
    if line.len() <= budget && !line.contains('\n') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / budget * FOLD.len() + 8);
    for (i, segment) in line.split(CRLF).enumerate() {
        if i > 0 {
            out.push_str(CRLF);
        }
        match version {
            VCardVersion::V2_1 => fold_at_blanks(segment, budget, &mut out),
            VCardVersion::V3_0 | VCardVersion::V4_0 => fold_at_budget(segment, budget, &mut out),
        }
    }
    out
}

fn fold_at_budget(segment: &str, budget: usize, out: &mut String) {
    let mut current_len = 0;

    for c in segment.chars() {
        let char_len = c.len_utf8();
        if current_len + char_len > budget {
            // A line ending in `=` reads as a quoted-printable soft break.
            if current_len > 2 && out.ends_with('=') {
                out.pop();
                out.push_str(FOLD);
                out.push('=');
                current_len = 2;
            } else {
                out.push_str(FOLD);
                current_len = 1;
            }
        }
        out.push(c);
        current_len += char_len;
    }
}

fn fold_at_blanks(segment: &str, budget: usize, out: &mut String) {
    let mut rest = segment;
    let mut room = budget;

    while rest.len() > room {
        let split = blank_split(rest, room).unwrap_or_else(|| forced_split(rest, room));
        out.push_str(&rest[..split]);
        out.push_str(FOLD);
        rest = &rest[split..];
        room = budget - 1;
    }
    out.push_str(rest);
}

/// Last blank at index `1..=room` not preceded by `=`, so the blank opens
/// the next line and the current one does not end in a soft break.
fn blank_split(rest: &str, room: usize) -> Option<usize> {
    let bytes = rest.as_bytes();
    if room >= bytes.len() {
        return None;
    }
    (1..=room)
        .rev()
        .find(|&i| matches!(bytes[i], b' ' | b'\t') && bytes[i - 1] != b'=')
}

/// Split point at most `room`, on a character boundary and outside `=XX`.
fn forced_split(rest: &str, room: usize) -> usize {
    let bytes = rest.as_bytes();
    let mut split = room.min(rest.len());

    if split >= 3 && bytes[split - 2] == b'=' {
        split -= 2;
    }
    while split >= 2 && bytes[split - 1] == b'=' {
        split -= 1;
    }

    while split > 0 && !rest.is_char_boundary(split) {
        split -= 1;
    }
    if split == 0 {
        // At least one character per line, even past the budget.
        split = rest.chars().next().map_or(rest.len(), char::len_utf8);
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::parse::unfold;

    fn physical_lines(folded: &str) -> Vec<&str> {
        folded.split(CRLF).collect()
    }

    #[test]
    fn short_line_unchanged() {
        assert_eq!(fold("FN:John Doe", VCardVersion::V4_0), "FN:John Doe");
    }

    #[test]
    fn fold_at_75_octets() {
        let line = "X".repeat(80);
        let folded = fold(&line, VCardVersion::V4_0);
        let lines = physical_lines(&folded);
        assert_eq!(lines[0].len(), 75);
        assert_eq!(lines[1], format!(" {}", "X".repeat(5)));
    }

    #[test]
    fn fold_respects_utf8() {
        let line = format!("NOTE:{}", "日".repeat(30));
        let folded = fold(&line, VCardVersion::V3_0);
        for part in physical_lines(&folded) {
            assert!(part.len() <= 75);
        }
        assert_eq!(unfold(&folded), vec![line]);
    }

    #[test]
    fn fold_multiple_times() {
        let line = "X".repeat(200);
        let folded = fold(&line, VCardVersion::V4_0);
        assert_eq!(folded.matches(FOLD).count(), 2);
        assert_eq!(unfold(&folded), vec![line]);
    }

    #[test]
    fn two_one_folds_before_blanks() {
        let line = format!("NOTE:{}", "word ".repeat(30));
        let folded = fold(line.trim_end(), VCardVersion::V2_1);
        for part in physical_lines(&folded).iter().skip(1) {
            assert!(part.starts_with("  "), "{part:?}");
        }
        for part in physical_lines(&folded) {
            assert!(part.len() <= 75);
        }
        assert_eq!(unfold(&folded), vec![line.trim_end().to_string()]);
    }

    #[test]
    fn two_one_forced_split_avoids_escapes() {
        let line = format!("X-Q:{}", "=C3=BC".repeat(20));
        let folded = fold_line(&line, VCardVersion::V2_1, 20);
        for part in physical_lines(&folded) {
            let body = part.trim_start();
            assert!(!body.ends_with('='), "{part:?}");
            assert!(part.len() <= 20);
        }
        assert_eq!(unfold(&folded), vec![line]);
    }

    #[test]
    fn existing_breaks_restart_the_count() {
        let line = format!("NOTE;ENCODING=QUOTED-PRINTABLE:{}=\r\n{}", "a".repeat(40), "b".repeat(70));
        let folded = fold(&line, VCardVersion::V2_1);
        assert_eq!(folded, line);
        assert_eq!(unfold(&folded), vec![line]);
    }

    #[test]
    fn two_one_blank_fold_never_leaves_a_trailing_equals() {
        let line = format!("NOTE;ENCODING=QUOTED-PRINTABLE:{}= tail", "a".repeat(42));
        let folded = fold(&line, VCardVersion::V2_1);
        for part in physical_lines(&folded) {
            assert!(!part.ends_with('='), "{part:?}");
            assert!(part.len() <= 75);
        }
        assert_eq!(unfold(&folded), vec![line]);
    }

    #[test]
    fn budget_fold_moves_a_dangling_equals_to_the_next_line() {
        // The fold point falls right after the `=` of an escape.
        let line = format!("NOTE;ENCODING=QUOTED-PRINTABLE:{}=C3=BC", "a".repeat(43));
        let folded = fold(&line, VCardVersion::V3_0);
        let lines = physical_lines(&folded);
        assert_eq!(lines[0].len(), 74);
        assert_eq!(lines[1], " =C3=BC");
        assert_eq!(unfold(&folded), vec![line]);
    }
}
