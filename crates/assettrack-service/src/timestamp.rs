//! Effective-time normalization for checkout and checkin.
//!
//! Operators may submit a full timestamp, a bare date, or nothing. A bare
//! date equal to today means "now" so same-day entries keep their real
//! time of day; any other bare date means midnight UTC of that day.
//! Input that does not parse falls back to now.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Resolve an optional user-supplied event time against `now`.
pub fn normalize_event_time(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return now;
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return parsed.and_utc();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if date == now.date_naive() {
            return now;
        }
        return date.and_time(chrono::NaiveTime::MIN).and_utc();
    }

    warn!(raw, "Unparseable event time, using the current time");
    now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 12).unwrap()
    }

    #[test]
    fn test_absent_or_blank_is_now() {
        assert_eq!(normalize_event_time(None, now()), now());
        assert_eq!(normalize_event_time(Some("   "), now()), now());
    }

    #[test]
    fn test_full_datetime_is_kept() {
        assert_eq!(
            normalize_event_time(Some("2024-01-10 00:00:00"), now()),
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            normalize_event_time(Some("2024-01-10T08:15:00+02:00"), now()),
            Utc.with_ymd_and_hms(2024, 1, 10, 6, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_date_only_today_is_now() {
        assert_eq!(normalize_event_time(Some("2024-03-05"), now()), now());
    }

    #[test]
    fn test_date_only_other_day_is_midnight() {
        assert_eq!(
            normalize_event_time(Some("2024-02-29"), now()),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_garbage_falls_back_to_now() {
        assert_eq!(normalize_event_time(Some("next tuesday"), now()), now());
    }
}
