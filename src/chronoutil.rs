//! Timestamp parsing and formatting for the formats used by SigV4 requests.
use {
    crate::constants::{ISO8601_COMPACT_FORMAT, ISO8601_DATE_FORMAT},
    chrono::{
        format::{ParseError, ParseResult},
        naive::{NaiveDate, NaiveDateTime, NaiveTime},
        offset::FixedOffset,
        DateTime, Utc,
    },
    lazy_static::lazy_static,
    regex::{Captures, Regex},
    std::str::FromStr,
};

lazy_static! {
    /// ISO 8601 basic format timestamp in UTC, e.g. `20150830T123600Z`.
    static ref ISO_8601_BASIC_REGEX: Regex = Regex::new(
        r"(?x)^
        (?P<year>\d{4})
        (?P<month>\d{2})
        (?P<day>\d{2})
        T
        (?P<hour>\d{2})
        (?P<minute>\d{2})
        (?P<second>\d{2})
        Z$").unwrap();

    /// RFC 1123 timestamp, e.g. `Sun, 30 Aug 2015 12:36:00 GMT`. The weekday is optional and never checked
    /// against the date.
    static ref RFC_1123_REGEX: Regex = Regex::new(
        r"(?x)^
        (?:[A-Za-z]+,\s*)?
        (?P<day>\d{1,2})\s+
        (?P<month>Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+
        (?P<year>\d{4})\s+
        (?P<hour>\d{2}):
        (?P<minute>\d{2}):
        (?P<second>\d{2})\s+
        (?:GMT|UTC|Z)$").unwrap();

    static ref INVALID: ParseError = DateTime::<FixedOffset>::from_str("").unwrap_err();
}

const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Parsing of the timestamp formats accepted in `X-Amz-Date` and `Date`.
pub(crate) trait ParseSigV4Timestamp: Sized {
    /// Parse an ISO 8601 basic format timestamp (`YYYYMMDD'T'HHMMSS'Z'`).
    fn parse_from_iso8601_basic(s: &str) -> ParseResult<Self>;

    /// Parse an RFC 1123 timestamp, discarding the weekday.
    fn parse_from_rfc1123(s: &str) -> ParseResult<Self>;

    /// Parse either format, trying ISO 8601 basic format first.
    fn parse_from_sigv4(s: &str) -> ParseResult<Self> {
        let s = s.trim();
        Self::parse_from_iso8601_basic(s).or_else(|_| Self::parse_from_rfc1123(s))
    }
}

impl ParseSigV4Timestamp for DateTime<Utc> {
    fn parse_from_iso8601_basic(s: &str) -> ParseResult<Self> {
        let Some(cap) = ISO_8601_BASIC_REGEX.captures(s) else {
            return Err(*INVALID);
        };

        let month = capture_u32(&cap, "month")?;
        to_utc(&cap, month)
    }

    fn parse_from_rfc1123(s: &str) -> ParseResult<Self> {
        let Some(cap) = RFC_1123_REGEX.captures(s) else {
            return Err(*INVALID);
        };

        let month_name = cap.name("month").map(|m| m.as_str()).ok_or(*INVALID)?;
        let month = MONTHS.iter().position(|m| *m == month_name).ok_or(*INVALID)? as u32 + 1;
        to_utc(&cap, month)
    }
}

fn capture_u32(cap: &Captures, name: &str) -> ParseResult<u32> {
    let m = cap.name(name).ok_or(*INVALID)?;
    u32::from_str(m.as_str()).map_err(|_| *INVALID)
}

/// Assemble a UTC timestamp from the year, day, and time captures; the month is supplied by the caller since its
/// representation differs between formats.
fn to_utc(cap: &Captures, month: u32) -> ParseResult<DateTime<Utc>> {
    let year = capture_u32(cap, "year")? as i32;
    let day = capture_u32(cap, "day")?;
    let hour = capture_u32(cap, "hour")?;
    let minute = capture_u32(cap, "minute")?;
    let second = capture_u32(cap, "second")?;

    let naive_date = NaiveDate::from_ymd_opt(year, month, day).ok_or(*INVALID)?;
    let naive_time = NaiveTime::from_hms_opt(hour, minute, second).ok_or(*INVALID)?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(NaiveDateTime::new(naive_date, naive_time), Utc))
}

/// Format a timestamp as `YYYYMMDD'T'HHMMSS'Z'`.
#[inline]
pub(crate) fn format_iso8601_compact(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO8601_COMPACT_FORMAT).to_string()
}

/// Format the date portion of a timestamp as `YYYYMMDD`.
#[inline]
pub(crate) fn format_iso8601_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO8601_DATE_FORMAT).to_string()
}
