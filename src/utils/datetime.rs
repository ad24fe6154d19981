use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;

/// Format a published-at value as "5 January 2023".
///
/// The API has been seen returning both RFC 3339 timestamps and the plain
/// `YYYY-MM-DD HH:MM:SS` form; anything unparseable is shown as-is.
pub fn format_published_at(raw: &str) -> String {
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return ts.to_zoned(TimeZone::UTC).strftime("%-d %B %Y").to_string();
    }

    if let Ok(dt) = DateTime::strptime("%Y-%m-%d %H:%M:%S", raw) {
        return dt.strftime("%-d %B %Y").to_string();
    }

    raw.to_string()
}
