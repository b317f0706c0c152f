//! Date, time and timestamp values.
//!
//! 4.0 writes the ISO 8601 basic form (`20240131T101500Z`), 2.1 and 3.0 the
//! extended form (`2024-01-31T10:15:00Z`). Both forms are accepted on input
//! in every version.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::version::VCardVersion;

/// A `date-and-or-time` value (`BDAY`, `ANNIVERSARY`, `DEATHDATE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateAndOrTime {
    /// A complete calendar date.
    Date(NaiveDate),
    /// A complete date with a time of day and optional UTC offset.
    DateTime {
        date: NaiveDate,
        time: NaiveTime,
        offset: Option<FixedOffset>,
    },
    /// A truncated form (`--0412`, `1985-04`, `T1022`), kept verbatim.
    Partial(String),
}

impl DateAndOrTime {
    /// Parses a value in basic or extended form.
    ///
    /// Returns `None` when the text is neither a complete nor a recognizable
    /// truncated date/time.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let s = value.trim();
        if s.is_empty() {
            return None;
        }

        if let Some(time) = s.strip_prefix('T') {
            return parse_time(time).map(|_| Self::Partial(s.to_string()));
        }

        if let Some((date_part, time_part)) = s.split_once('T') {
            let (time, offset) = parse_time(time_part)?;
            return match parse_date(date_part) {
                Some(date) => Some(Self::DateTime { date, time, offset }),
                None if is_truncated_date(date_part) => Some(Self::Partial(s.to_string())),
                None => None,
            };
        }

        if let Some(date) = parse_date(s) {
            return Some(Self::Date(date));
        }
        is_truncated_date(s).then(|| Self::Partial(s.to_string()))
    }

    /// Formats the value for `version`.
    #[must_use]
    pub fn format(&self, version: VCardVersion) -> String {
        let basic = matches!(version, VCardVersion::V4_0);
        match self {
            Self::Date(date) => format_date(*date, basic),
            Self::DateTime { date, time, offset } => {
                let mut out = format_date(*date, basic);
                out.push('T');
                if basic {
                    out.push_str(&time.format("%H%M%S").to_string());
                } else {
                    out.push_str(&time.format("%H:%M:%S").to_string());
                }
                if let Some(offset) = offset {
                    out.push_str(&format_offset(*offset, basic));
                }
                out
            }
            Self::Partial(text) => text.clone(),
        }
    }

    /// Returns the calendar date, if the value carries a complete one.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) | Self::DateTime { date, .. } => Some(*date),
            Self::Partial(_) => None,
        }
    }
}

impl From<NaiveDate> for DateAndOrTime {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for DateAndOrTime {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime {
            date: value.date(),
            time: value.time(),
            offset: None,
        }
    }
}

/// Parses a `REV`/`CREATED` timestamp.
///
/// Accepts `YYYYMMDDTHHMMSSZ`, a basic form with numeric offset, RFC 3339,
/// and a basic or extended form without zone (read as UTC).
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let s = value.trim();

    if let Some(stripped) = s.strip_suffix('Z') {
        for pattern in ["%Y%m%dT%H%M%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, pattern) {
                return Some(naive.and_utc());
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y%m%dT%H%M%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y%m%dT%H%M%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Formats a timestamp for `version`.
#[must_use]
pub fn format_timestamp(value: &DateTime<Utc>, version: VCardVersion) -> String {
    match version {
        VCardVersion::V4_0 => value.format("%Y%m%dT%H%M%SZ").to_string(),
        VCardVersion::V2_1 | VCardVersion::V3_0 => value.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    }
}

fn format_date(date: NaiveDate, basic: bool) -> String {
    if basic {
        date.format("%Y%m%d").to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

fn format_offset(offset: FixedOffset, basic: bool) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return "Z".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if basic {
        format!("{sign}{hours:02}{minutes:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}")
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    if s.len() == 10 {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    }
    None
}

/// Parses a time with an optional `Z` or numeric offset.
fn parse_time(s: &str) -> Option<(NaiveTime, Option<FixedOffset>)> {
    let (time, offset) = if let Some(stripped) = s.strip_suffix('Z') {
        (stripped, FixedOffset::east_opt(0))
    } else if let Some(pos) = s.rfind(['+', '-']).filter(|&pos| pos > 0) {
        (&s[..pos], Some(parse_offset(&s[pos..])?))
    } else {
        (s, None)
    };

    let digits: String = time.chars().filter(|&c| c != ':').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let parsed = match digits.len() {
        2 => NaiveTime::parse_from_str(&format!("{digits}0000"), "%H%M%S"),
        4 => NaiveTime::parse_from_str(&format!("{digits}00"), "%H%M%S"),
        6 => NaiveTime::parse_from_str(&digits, "%H%M%S"),
        _ => return None,
    }
    .ok()?;
    Some((parsed, offset))
}

/// Parses `+HH`, `+HHMM` or `+HH:MM`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|&c| c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes): (i32, i32) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Recognizes `---DD`, `--MM`, `--MMDD`, `--MM-DD`, `YYYY` and `YYYY-MM`.
fn is_truncated_date(s: &str) -> bool {
    let two = |part: &str, max: u32| {
        part.len() == 2
            && part
                .parse::<u32>()
                .is_ok_and(|n| (1..=max).contains(&n))
    };

    if let Some(day) = s.strip_prefix("---") {
        return two(day, 31);
    }
    if let Some(rest) = s.strip_prefix("--") {
        return match rest.len() {
            2 => two(rest, 12),
            4 => two(&rest[..2], 12) && two(&rest[2..], 31),
            5 => rest.as_bytes()[2] == b'-' && two(&rest[..2], 12) && two(&rest[3..], 31),
            _ => false,
        };
    }

    let year_ok = |year: &str| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit());
    match s.split_once('-') {
        None => year_ok(s),
        Some((year, month)) => year_ok(year) && two(month, 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_both_date_forms() {
        assert_eq!(
            DateAndOrTime::parse("1985-04-12"),
            Some(DateAndOrTime::Date(date(1985, 4, 12)))
        );
        assert_eq!(
            DateAndOrTime::parse("19850412"),
            Some(DateAndOrTime::Date(date(1985, 4, 12)))
        );
    }

    #[test]
    fn parses_date_time_with_offset() {
        let parsed = DateAndOrTime::parse("19961022T140000-0500").unwrap();
        let DateAndOrTime::DateTime { date: d, time, offset } = &parsed else {
            panic!("expected date-time, got {parsed:?}");
        };
        assert_eq!(*d, date(1996, 10, 22));
        assert_eq!(*time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert_eq!(offset.unwrap().local_minus_utc(), -5 * 3600);
        assert_eq!(parsed.format(VCardVersion::V4_0), "19961022T140000-0500");
        assert_eq!(parsed.format(VCardVersion::V3_0), "1996-10-22T14:00:00-05:00");
    }

    #[test]
    fn utc_is_written_as_z() {
        let parsed = DateAndOrTime::parse("2001-02-03T04:05:06Z").unwrap();
        assert_eq!(parsed.format(VCardVersion::V4_0), "20010203T040506Z");
    }

    #[test]
    fn truncated_forms_are_partial() {
        for input in ["--0412", "--04-12", "---12", "1985", "1985-04", "T102200", "--0412T1022"] {
            assert_eq!(
                DateAndOrTime::parse(input),
                Some(DateAndOrTime::Partial(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(DateAndOrTime::parse("circa 1800"), None);
        assert_eq!(DateAndOrTime::parse("1985-13-45"), None);
        assert_eq!(DateAndOrTime::parse(""), None);
    }

    #[test]
    fn version_specific_date_format() {
        let value = DateAndOrTime::Date(date(2024, 1, 31));
        assert_eq!(value.format(VCardVersion::V4_0), "20240131");
        assert_eq!(value.format(VCardVersion::V2_1), "2024-01-31");
    }

    #[test]
    fn timestamps() {
        let ts = parse_timestamp("20240131T101500Z").unwrap();
        assert_eq!(format_timestamp(&ts, VCardVersion::V4_0), "20240131T101500Z");
        assert_eq!(format_timestamp(&ts, VCardVersion::V3_0), "2024-01-31T10:15:00Z");
        assert_eq!(parse_timestamp("2024-01-31T10:15:00Z"), Some(ts));
        assert_eq!(parse_timestamp("2024-01-31T11:15:00+01:00"), Some(ts));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
