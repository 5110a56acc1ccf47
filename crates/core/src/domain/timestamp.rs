use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parses a backend timestamp. Offsets are honoured; naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::parse_timestamp;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-03-01T10:00:00-03:00").expect("parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).single().expect("valid"));
    }

    #[test]
    fn parses_naive_and_date_only_values_as_utc() {
        assert_eq!(
            parse_timestamp("2024-03-01 08:30:00"),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).single()
        );
        assert_eq!(parse_timestamp("2024-03-01"), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("   "), None);
    }
}
