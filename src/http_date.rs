//! HTTP-date helpers
//!
//! IMF-fixdate formatting and lenient parsing for `Date`, `Last-Modified`
//! and `If-Modified-Since` values.

use chrono::{DateTime, Utc};

/// Formats `at` as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parses an HTTP-date. Returns `None` for anything unparseable.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
