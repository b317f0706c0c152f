//! vCard record reader.
//!
//! Frames records on `BEGIN:VCARD`/`END:VCARD`, selects the grammar from each
//! record's `VERSION` row and decodes the remaining rows. Framing and version
//! problems fail the read; problems confined to one row are collected as
//! diagnostics and the row is skipped.

use kartei_core::config::Settings;
use kartei_core::constants::VCARD_COMPONENT;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{LogicalLine, Unfolder, parse_row_at};
use super::values::decode_property;
use crate::rfc::vcard::core::{VCard, VCardVersion};

/// Reader behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Keep parameters outside the standard vocabulary.
    pub preserve_non_standard_parameters: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            preserve_non_standard_parameters: true,
        }
    }
}

impl From<&Settings> for ReadOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            preserve_non_standard_parameters: settings.codec.preserve_non_standard_parameters,
        }
    }
}

/// A reading session; owns the diagnostics of the last [`VcfReader::read`].
#[derive(Debug, Default)]
pub struct VcfReader {
    options: ReadOptions,
    diagnostics: Vec<ParseError>,
}

/// Where the framing loop is.
enum Frame {
    Outside,
    InCard {
        begin_line: usize,
        lines: Vec<LogicalLine>,
        /// Depth of nested `BEGIN:VCARD` blocks being skipped.
        nested: usize,
    },
}

impl VcfReader {
    #[must_use]
    pub fn new(options: ReadOptions) -> Self {
        Self {
            options,
            diagnostics: Vec::new(),
        }
    }

    /// Row- and value-level problems found by the last read.
    #[must_use]
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    /// Reads every record in `input`.
    ///
    /// Blank input yields no records.
    ///
    /// ## Errors
    /// Returns `MissingBegin` if non-blank input holds no record, `MissingEnd`
    /// for an unterminated record and `UnsupportedVersion` for an unknown
    /// `VERSION` token.
    #[tracing::instrument(skip(self, input), fields(input_len = input.len()))]
    pub fn read(&mut self, input: &str) -> ParseResult<Vec<VCard>> {
        tracing::debug!("Parsing vCard document");
        self.diagnostics.clear();

        let mut cards = Vec::new();
        let mut frame = Frame::Outside;
        let mut stray_line = None;
        let mut unfolder = Unfolder::new(input);

        #[expect(
            clippy::while_let_on_iterator,
            reason = "diagnostics are drained from the unfolder between lines"
        )]
        while let Some(line) = unfolder.next() {
            self.diagnostics.extend(unfolder.take_diagnostics());
            select_soft_breaks(&mut unfolder, &frame, &line.text);

            frame = match frame {
                Frame::Outside if is_marker(&line.text, "BEGIN") => Frame::InCard {
                    begin_line: line.line,
                    lines: Vec::new(),
                    nested: 0,
                },
                Frame::Outside => {
                    tracing::warn!(line = line.line, "Dropping line outside of a vCard");
                    stray_line.get_or_insert(line.line);
                    self.diagnostics.push(ParseError::new(
                        ParseErrorKind::MissingBegin,
                        line.line,
                        "line outside of BEGIN:VCARD/END:VCARD",
                    ));
                    Frame::Outside
                }
                Frame::InCard {
                    begin_line,
                    lines,
                    nested,
                } => self.advance_card(line, begin_line, lines, nested, &mut cards)?,
            };
        }
        self.diagnostics.extend(unfolder.take_diagnostics());

        if let Frame::InCard { begin_line, .. } = frame {
            tracing::warn!(line = begin_line, "Unterminated vCard");
            return Err(ParseError::new(
                ParseErrorKind::MissingEnd,
                begin_line,
                "record is not closed by END:VCARD",
            ));
        }
        if cards.is_empty()
            && let Some(line) = stray_line
        {
            return Err(ParseError::new(
                ParseErrorKind::MissingBegin,
                line,
                "no BEGIN:VCARD found",
            ));
        }

        tracing::debug!(
            cards = cards.len(),
            diagnostics = self.diagnostics.len(),
            "vCard document parsed"
        );
        Ok(cards)
    }

    /// Feeds one line of an open record.
    fn advance_card(
        &mut self,
        line: LogicalLine,
        begin_line: usize,
        mut lines: Vec<LogicalLine>,
        nested: usize,
        cards: &mut Vec<VCard>,
    ) -> ParseResult<Frame> {
        if is_marker(&line.text, "BEGIN") {
            if nested == 0 {
                tracing::debug!(line = line.line, "Skipping nested vCard");
                self.diagnostics.push(ParseError::new(
                    ParseErrorKind::NestedCard,
                    line.line,
                    "nested vCard skipped",
                ));
            }
            return Ok(Frame::InCard {
                begin_line,
                lines,
                nested: nested + 1,
            });
        }

        if is_marker(&line.text, "END") {
            if nested > 0 {
                return Ok(Frame::InCard {
                    begin_line,
                    lines,
                    nested: nested - 1,
                });
            }
            cards.push(self.build_card(begin_line, &lines)?);
            return Ok(Frame::Outside);
        }

        if nested == 0 {
            lines.push(line);
        }
        Ok(Frame::InCard {
            begin_line,
            lines,
            nested,
        })
    }

    /// Decodes the rows of one record.
    fn build_card(&mut self, begin_line: usize, lines: &[LogicalLine]) -> ParseResult<VCard> {
        let version_row = lines.iter().position(|l| is_version_row(&l.text));

        let version = match version_row {
            Some(index) => {
                let row = &lines[index];
                let token = version_token(&row.text);
                VCardVersion::parse(token).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::UnsupportedVersion,
                        row.line,
                        format!("unsupported version {token:?}"),
                    )
                })?
            }
            None => {
                tracing::debug!(line = begin_line, "No VERSION row, reading as 2.1");
                self.diagnostics
                    .push(ParseError::missing_property(begin_line, "VERSION"));
                VCardVersion::V2_1
            }
        };

        let mut card = VCard::with_version(version);
        for (index, line) in lines.iter().enumerate() {
            if Some(index) == version_row {
                continue;
            }
            let row = match parse_row_at(
                &line.text,
                version,
                self.options.preserve_non_standard_parameters,
                line.line,
            ) {
                Ok(row) => row,
                Err(err) => {
                    tracing::warn!(line = line.line, error = %err, "Skipping malformed row");
                    self.diagnostics.push(err);
                    continue;
                }
            };
            tracing::trace!(key = %row.key, line = line.line, "Decoding property");
            if let Some(property) = decode_property(&row, &mut self.diagnostics) {
                card.add_property(property);
            }
        }

        Ok(card)
    }
}

/// Parses every record with default options, discarding diagnostics.
///
/// ## Errors
/// Returns an error on framing or version problems; see [`VcfReader::read`].
pub fn parse(input: &str) -> ParseResult<Vec<VCard>> {
    VcfReader::default().read(input)
}

/// Parses exactly the first record.
///
/// ## Errors
/// Returns an error on framing or version problems, or `MissingBegin` if the
/// input holds no record.
pub fn parse_single(input: &str) -> ParseResult<VCard> {
    parse(input)?
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingBegin, 1, "no vCard found"))
}

/// Matches `BEGIN:VCARD` / `END:VCARD`, ignoring case and surrounding blanks.
fn is_marker(text: &str, marker: &str) -> bool {
    text.trim()
        .split_once(':')
        .is_some_and(|(name, value)| {
            name.trim().eq_ignore_ascii_case(marker)
                && value.trim().eq_ignore_ascii_case(VCARD_COMPONENT)
        })
}

fn is_version_row(text: &str) -> bool {
    text.split([':', ';'])
        .next()
        .is_some_and(|key| key.trim().eq_ignore_ascii_case("VERSION"))
}

fn version_token(text: &str) -> &str {
    text.split_once(':').map_or("", |(_, v)| v.trim())
}

/// Quoted-printable soft breaks are joined until a record's `VERSION` row
/// names a version without quoted-printable; each new record starts over.
fn select_soft_breaks(unfolder: &mut Unfolder<'_>, frame: &Frame, text: &str) {
    match frame {
        Frame::Outside if is_marker(text, "BEGIN") => unfolder.set_soft_breaks(true),
        Frame::InCard { nested: 0, .. } if is_version_row(text) => {
            if let Some(version) = VCardVersion::parse(version_token(text)) {
                unfolder.set_soft_breaks(version.supports_quoted_printable());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::PropertyKind;

    #[test]
    fn parse_simple_vcard() {
        let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:John Doe\r\nEND:VCARD\r\n";
        let cards = parse(input).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].version, VCardVersion::V4_0);
        assert_eq!(cards[0].formatted_name(), Some("John Doe"));
    }

    #[test]
    fn parse_multiple_cards() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:A\r\nEND:VCARD\r\n\
                     BEGIN:VCARD\r\nVERSION:2.1\r\nFN:B\r\nEND:VCARD\r\n";
        let cards = parse(input).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].version, VCardVersion::V2_1);
    }

    #[test]
    fn version_row_selects_grammar_even_when_late() {
        let input = "BEGIN:VCARD\r\nNOTE:a\\,b\r\nVERSION:3.0\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        assert_eq!(card.first(PropertyKind::Note).unwrap().as_text(), Some("a,b"));
    }

    #[test]
    fn trailing_equals_in_4_0_does_not_join_the_next_row() {
        let input = "BEGIN:VCARD\r\nVERSION:4.0\r\n\
                     NOTE;ENCODING=QUOTED-PRINTABLE:abc=\r\n\
                     FN:John\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        assert_eq!(card.formatted_name(), Some("John"));
        let note = card.first(PropertyKind::Note).unwrap();
        assert_eq!(note.as_text(), Some("abc="));
    }

    #[test]
    fn soft_breaks_resume_for_the_next_2_1_card() {
        let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\nEND:VCARD\r\n\
                     BEGIN:VCARD\r\nVERSION:2.1\r\n\
                     NOTE;ENCODING=QUOTED-PRINTABLE:abc=\r\ndef\r\n\
                     FN:B\r\nEND:VCARD\r\n";
        let cards = parse(input).unwrap();
        assert_eq!(cards.len(), 2);
        let note = cards[1].first(PropertyKind::Note).unwrap();
        assert_eq!(note.as_text(), Some("abcdef"));
        assert_eq!(cards[1].formatted_name(), Some("B"));
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\r\n\r\n").unwrap().is_empty());
    }

    #[test]
    fn structural_errors() {
        let err = parse("FN:John\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingBegin);

        let err = parse("BEGIN:VCARD\r\nVERSION:4.0\r\nFN:John\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingEnd);
        assert_eq!(err.line, 1);

        let err = parse("BEGIN:VCARD\r\nVERSION:5.0\r\nEND:VCARD\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnsupportedVersion);
    }

    #[test_log::test]
    fn missing_version_reads_as_2_1() {
        let mut reader = VcfReader::default();
        let cards = reader
            .read("BEGIN:VCARD\r\nNOTE:a\\,b\r\nEND:VCARD\r\n")
            .unwrap();
        assert_eq!(cards[0].version, VCardVersion::V2_1);
        assert_eq!(
            cards[0].first(PropertyKind::Note).unwrap().as_text(),
            Some("a\\,b")
        );
        assert_eq!(reader.diagnostics()[0].kind, ParseErrorKind::MissingProperty);
    }

    #[test_log::test]
    fn nested_card_is_skipped() {
        let input = "BEGIN:VCARD\r\nVERSION:2.1\r\nFN:Boss\r\nAGENT:\r\n\
                     BEGIN:VCARD\r\nVERSION:2.1\r\nFN:Assistant\r\nEND:VCARD\r\n\
                     TEL:123\r\nEND:VCARD\r\n";
        let mut reader = VcfReader::default();
        let cards = reader.read(input).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].formatted_name(), Some("Boss"));
        assert_eq!(cards[0].properties_of(PropertyKind::FormattedName).count(), 1);
        assert!(cards[0].first(PropertyKind::Telephone).is_some());
        assert!(
            reader
                .diagnostics()
                .iter()
                .any(|d| d.kind == ParseErrorKind::NestedCard)
        );
    }

    #[test_log::test]
    fn stray_lines_are_reported() {
        let mut reader = VcfReader::default();
        let cards = reader
            .read("junk\r\nBEGIN:VCARD\r\nVERSION:4.0\r\nFN:x\r\nEND:VCARD\r\n")
            .unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(reader.diagnostics().len(), 1);
    }

    #[test]
    fn non_standard_parameters_can_be_dropped() {
        let mut reader = VcfReader::new(ReadOptions {
            preserve_non_standard_parameters: false,
        });
        let cards = reader
            .read("BEGIN:VCARD\r\nVERSION:4.0\r\nTEL;X-A=1;TYPE=cell:1\r\nEND:VCARD\r\n")
            .unwrap();
        let tel = cards[0].first(PropertyKind::Telephone).unwrap();
        assert!(tel.params.non_standard.is_empty());
    }

    #[test]
    fn options_from_settings() {
        let mut settings = Settings::default();
        settings.codec.preserve_non_standard_parameters = false;
        assert!(!ReadOptions::from(&settings).preserve_non_standard_parameters);
    }
}
