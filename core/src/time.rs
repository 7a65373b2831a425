//! Time related utils.

use chrono::Utc;

/// The timestamp type used throughout the signers.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a new DateTime with the current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a DateTime as an HTTP `Date` header value.
///
/// For example: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// `to_rfc2822` is not usable here since it renders the zone as `+0000`
/// while HTTP requires the literal `GMT`.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
