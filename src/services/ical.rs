//! Minimal iCalendar content-line helpers
//!
//! CalDAV responses embed iCalendar text inside XML multistatus bodies.
//! The calendar and tasks clients only need a few properties per component,
//! so this stays line-oriented rather than pulling in a full parser.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Undo RFC 5545 line folding (continuation lines start with a space)
pub(crate) fn unfold(body: &str) -> String {
    body.replace("\r\n ", "").replace("\n ", "")
}

/// Value of an iCalendar content line, ignoring property parameters
///
/// Handles both `SUMMARY:text` and the parameterized form
/// `DTSTART;TZID=Europe/Lisbon:20240101T090000`.
pub(crate) fn value<'a>(line: &'a str, property: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(property)?;
    if let Some(value) = rest.strip_prefix(':') {
        return Some(value);
    }
    rest.strip_prefix(';')?.split_once(':').map(|(_, v)| v)
}

/// Parse the date-time shapes CalDAV servers emit (UTC, floating, all-day)
pub(crate) fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y%m%dT%H%M%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Undo RFC 5545 text escaping
pub(crate) fn unescape(value: &str) -> String {
    value
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\n", " ")
        .replace("\\\\", "\\")
}
