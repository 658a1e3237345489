use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses the timestamp shapes the API and HTML date inputs produce.
///
/// Plain dates resolve to midnight. Offsets are dropped: every bucket is
/// computed in the operator's local time.
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(with_offset) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_api_and_form_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .expect("date");
        assert_eq!(parse("2024-03-01T08:30:00"), Some(expected));
        assert_eq!(parse("2024-03-01T08:30"), Some(expected));
        assert_eq!(parse("2024-03-01 08:30:00"), Some(expected));
        assert_eq!(parse("2024-03-01T08:30:00+01:00"), Some(expected));
    }

    #[test]
    fn plain_date_is_midnight() {
        let parsed = parse("2024-03-01").expect("date");
        assert_eq!(parsed.time(), NaiveTime::MIN);
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("yesterday"), None);
    }
}
