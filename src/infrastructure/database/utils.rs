//! Database utility functions.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a stored datetime, accepting RFC3339 and SQLite's default
/// format.
///
/// Supports:
/// - RFC3339: "2026-03-01T17:28:13Z", "2026-03-01T17:28:13+00:00"
/// - SQLite default: "2026-03-01 17:28:13"
/// - ISO 8601 without timezone: "2026-03-01T17:28:13"
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive_dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive_dt, Utc));
    }

    if let Ok(naive_dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive_dt, Utc));
    }

    // Surface the RFC3339 error when nothing matched.
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_datetime("2026-03-01T17:28:13Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-01T17:28:13+00:00");
    }

    #[test]
    fn test_parse_sqlite_format() {
        let dt = parse_datetime("2026-03-01 17:28:13").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-01T17:28:13+00:00");
    }

    #[test]
    fn test_parse_iso8601_no_timezone() {
        let dt = parse_datetime("2026-03-01T17:28:13").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-01T17:28:13+00:00");
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(parse_datetime("invalid datetime").is_err());
        assert!(parse_datetime("").is_err());
    }
}
