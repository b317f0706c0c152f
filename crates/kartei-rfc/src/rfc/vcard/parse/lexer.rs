//! vCard lexer: line unfolding and content-row tokenizing.

use std::borrow::Cow;
use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use kartei_core::constants::CRLF;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::vcard::codec::mask::{find_unescaped, unmask};
use crate::rfc::vcard::codec::quoted_printable;
use crate::rfc::vcard::core::{TransportEncoding, VCardParameter, VCardVersion, param_names};

/// One unfolded line and the physical line it starts on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub line: usize,
    pub text: String,
}

/// Lazily joins physical lines into logical lines.
///
/// A physical line starting with a space or tab continues the previous one;
/// the whitespace character is removed and nothing is inserted. In a row that
/// declares quoted-printable, a line ending with `=` continues on the next
/// line and the `=` CRLF sequence is kept for the decoder. Empty lines are
/// skipped; continuation lines without a predecessor are dropped and reported
/// through [`Unfolder::take_diagnostics`].
///
/// Soft-break joining is on until [`Unfolder::set_soft_breaks`] turns it off,
/// which the reader does once a card declares a version without
/// quoted-printable.
pub struct Unfolder<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    diagnostics: Vec<ParseError>,
    soft_breaks: bool,
}

impl<'a> Unfolder<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate().peekable(),
            diagnostics: Vec::new(),
            soft_breaks: true,
        }
    }

    /// Enables or disables joining quoted-printable soft breaks for the
    /// lines that follow.
    pub fn set_soft_breaks(&mut self, enabled: bool) {
        self.soft_breaks = enabled;
    }

    /// Returns and clears the diagnostics gathered so far.
    pub fn take_diagnostics(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl Iterator for Unfolder<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        let (index, first) = loop {
            let (index, raw) = self.lines.next()?;
            if raw.is_empty() {
                continue;
            }
            if raw.starts_with([' ', '\t']) {
                tracing::warn!(line = index + 1, "Dropping continuation line without a preceding line");
                self.diagnostics.push(ParseError::new(
                    ParseErrorKind::OrphanContinuation,
                    index + 1,
                    "continuation line without a preceding line",
                ));
                continue;
            }
            break (index, raw);
        };

        let mut text = first.to_string();

        while let Some(&(_, next)) = self.lines.peek() {
            if self.soft_breaks
                && text.ends_with('=')
                && !next.is_empty()
                && declares_quoted_printable(&text)
            {
                text.push_str(CRLF);
                text.push_str(next);
            } else if let Some(continuation) = next.strip_prefix([' ', '\t']) {
                text.push_str(continuation);
            } else {
                break;
            }
            self.lines.next();
        }

        Some(LogicalLine {
            line: index + 1,
            text,
        })
    }
}

/// Unfolds `input` into logical lines, discarding diagnostics.
#[must_use]
pub fn unfold(input: &str) -> Vec<String> {
    Unfolder::new(input).map(|l| l.text).collect()
}

/// A tokenized content line.
///
/// The value is kept masked; quoted-printable has already been removed when
/// the row requested it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRow<'a> {
    /// Property group (e.g., "item1" in "item1.TEL").
    pub group: Option<&'a str>,
    /// Property key (uppercase).
    pub key: String,
    /// Parameters in input order, all `TYPE` occurrences merged into one.
    pub params: Vec<VCardParameter>,
    pub raw_value: Cow<'a, str>,
    pub version: VCardVersion,
    pub line: usize,
}

impl ContentRow<'_> {
    /// Returns the unmasked value.
    #[must_use]
    pub fn value(&self) -> Cow<'_, str> {
        unmask(&self.raw_value, self.version)
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&VCardParameter> {
        find_param(&self.params, name)
    }
}

/// Tokenizes a logical line, keeping unknown parameters.
///
/// ## Errors
/// Returns an `InvalidPropertyName` error if the key is empty or malformed, or
/// the `:` separator is missing.
pub fn parse_row(line: &str, version: VCardVersion) -> ParseResult<ContentRow<'_>> {
    parse_row_at(line, version, true, 0)
}

/// Tokenizes a logical line.
///
/// `line_no` is attached to errors. With `preserve_non_standard` unset,
/// parameters outside the standard vocabulary are dropped.
///
/// ## Errors
/// Returns an `InvalidPropertyName` error if the key is empty or malformed, or
/// the `:` separator is missing.
pub fn parse_row_at(
    line: &str,
    version: VCardVersion,
    preserve_non_standard: bool,
    line_no: usize,
) -> ParseResult<ContentRow<'_>> {
    let colon = find_value_separator(line).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_no,
            "missing colon separator",
        )
    })?;
    let (head, raw_value) = (&line[..colon], &line[colon + 1..]);

    let (group, rest) = match find_unescaped(head, b'.') {
        Some(dot) if !head[..dot].contains(';') && dot > 0 => (Some(&head[..dot]), &head[dot + 1..]),
        _ => (None, head),
    };

    let mut segments = split_outside_quotes(rest, b';').into_iter();
    let key = segments.next().unwrap_or_default().trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_no,
            format!("invalid property name: {key:?}"),
        ));
    }

    let mut params: Vec<VCardParameter> = Vec::new();
    for segment in segments {
        let Some(param) = parse_parameter(segment) else {
            continue;
        };
        if !preserve_non_standard && !VCardParameter::is_standard_name(&param.name) {
            tracing::trace!(name = %param.name, "Dropping non-standard parameter");
            continue;
        }
        if param.name == param_names::TYPE
            && let Some(existing) = params.iter_mut().find(|p| p.name == param_names::TYPE)
        {
            existing.values.extend(param.values);
            continue;
        }
        params.push(param);
    }

    let raw_value = if version.supports_quoted_printable() && requests_quoted_printable(&params) {
        let charset = find_param(&params, param_names::CHARSET).and_then(VCardParameter::value);
        Cow::Owned(quoted_printable::decode(raw_value, charset))
    } else {
        Cow::Borrowed(raw_value)
    };

    Ok(ContentRow {
        group,
        key: key.to_ascii_uppercase(),
        params,
        raw_value,
        version,
        line: line_no,
    })
}

/// Parses one `NAME=v1,v2` segment or a bare 2.1 token.
///
/// Quoted values keep their quotes.
fn parse_parameter(segment: &str) -> Option<VCardParameter> {
    let segment = segment.trim();
    if segment.is_empty() {
        return None;
    }

    let quote = segment.find('"').unwrap_or(segment.len());
    let Some(eq) = segment[..quote].find('=') else {
        return Some(bare_parameter(segment));
    };

    let name = segment[..eq].trim();
    if name.is_empty() {
        tracing::debug!(segment, "Ignoring parameter without a name");
        return None;
    }
    let values = split_outside_quotes(&segment[eq + 1..], b',')
        .into_iter()
        .map(|v| v.trim().to_string())
        .collect();
    Some(VCardParameter::multi(name, values))
}

/// Classifies a 2.1 parameter written without a name.
fn bare_parameter(token: &str) -> VCardParameter {
    let name = if TransportEncoding::parse(token).is_some() {
        param_names::ENCODING
    } else if ["INLINE", "URL", "CONTENT-ID", "CID"]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(token))
    {
        param_names::VALUE
    } else {
        param_names::TYPE
    };
    VCardParameter::new(name, token)
}

fn find_param<'p>(params: &'p [VCardParameter], name: &str) -> Option<&'p VCardParameter> {
    params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

fn requests_quoted_printable(params: &[VCardParameter]) -> bool {
    find_param(params, param_names::ENCODING)
        .and_then(VCardParameter::value)
        .and_then(TransportEncoding::parse)
        == Some(TransportEncoding::QuotedPrintable)
}

/// Whether the header of `line` declares quoted-printable.
fn declares_quoted_printable(line: &str) -> bool {
    let Some(colon) = find_value_separator(line) else {
        return false;
    };
    split_outside_quotes(&line[..colon], b';')
        .into_iter()
        .skip(1)
        .any(|segment| {
            let token = segment
                .split_once('=')
                .filter(|(name, _)| name.trim().eq_ignore_ascii_case(param_names::ENCODING))
                .map_or(segment, |(_, value)| value);
            TransportEncoding::parse(token) == Some(TransportEncoding::QuotedPrintable)
        })
}

/// Finds the colon that separates name/params from value.
///
/// Colons inside quoted parameter values are skipped. With unbalanced quotes
/// the first colon is used.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }

    line.find(':')
}

/// Splits on an ASCII separator outside double quotes.
fn split_outside_quotes(s: &str, separator: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, b) in s.bytes().enumerate() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == separator && !in_quotes {
            parts.push(&s[start..i]);
            start = i + 1;
        } else {
            // part of the current segment
        }
    }

    parts.push(&s[start..]);
    parts
}
