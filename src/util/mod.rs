use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a user- or file-supplied timestamp.
///
/// RFC 3339 values keep their offset; naive values (as produced by a
/// `datetime-local` input or a spreadsheet) are read in the browser's zone.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(raw, fmt).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Render a timestamp for display in the browser's zone.
pub(crate) fn format_local(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%a %d %b %Y, %H:%M").to_string()
}

/// Value for a `datetime-local` input.
pub(crate) fn to_input_value(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%dT%H:%M").to_string()
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

pub(crate) fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        let ts = parse_timestamp("2026-01-30T09:00:00+02:00").expect("should parse");
        assert_eq!(ts.to_rfc3339(), "2026-01-30T07:00:00+00:00");
    }

    #[test]
    fn test_parse_naive_formats() {
        let a = parse_timestamp("2026-01-30T09:00").expect("input format");
        let b = parse_timestamp("2026-01-30 09:00:00").expect("spreadsheet format");
        assert_eq!(a, b);
        assert!(parse_timestamp("  ").is_none());
        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn test_input_value_roundtrip() {
        let ts = parse_timestamp("2026-01-30T15:45").expect("should parse");
        assert_eq!(to_input_value(&ts), "2026-01-30T15:45");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "post", "posts"), "1 post");
        assert_eq!(pluralize(3, "post", "posts"), "3 posts");
    }
}
