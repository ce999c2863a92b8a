//! Time and date parsing utilities.

use crate::error::{DeskError, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Resolve a local calendar day at the given time to UTC.
fn local_day_at(date: NaiveDate, time: NaiveTime, field_name: &str) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DeskError::validation(field_name, "ambiguous local time"))
}

/// Parse a flexible time specification into a `DateTime<Utc>`.
///
/// Supports:
/// - RFC3339: `2025-01-15T12:00:00Z`
/// - Simple date: `2025-01-15` (9:00 AM local time)
/// - Relative duration: `+1h`, `+2d`, `+1w`, `+30m`
/// - Keywords: `today`, `tomorrow`, `next-week`
///
/// # Errors
///
/// Returns a validation error for unrecognized formats or units.
pub fn parse_flexible_timestamp(s: &str, field_name: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return local_day_at(date, nine, field_name);
    }

    if let Some(rest) = s.strip_prefix('+') {
        if let Some(unit) = rest.chars().last() {
            if let Ok(amount) = rest[..rest.len() - unit.len_utf8()].parse::<i64>() {
                return relative_from_now(amount, unit, field_name);
            }
        }
    }

    let today = Local::now().date_naive();
    match s.to_lowercase().as_str() {
        "today" => local_day_at(today, nine, field_name),
        "tomorrow" => local_day_at(today + Duration::days(1), nine, field_name),
        "next-week" | "nextweek" => local_day_at(today + Duration::weeks(1), nine, field_name),
        _ => Err(DeskError::validation(
            field_name,
            "invalid time format (try: +2d, tomorrow, next-week, or 2025-01-15)",
        )),
    }
}

/// `now + amount unit`, rejecting negative or unrepresentable offsets.
fn relative_from_now(amount: i64, unit: char, field_name: &str) -> Result<DateTime<Utc>> {
    if amount < 0 {
        return Err(DeskError::validation(field_name, "relative offset must not be negative"));
    }
    let duration = match unit {
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        'w' => Duration::try_weeks(amount),
        _ => {
            return Err(DeskError::validation(
                field_name,
                "invalid unit (use m, h, d, w)",
            ));
        }
    };
    duration
        .and_then(|d| Utc::now().checked_add_signed(d))
        .ok_or_else(|| DeskError::validation(field_name, "out of range"))
}

/// Parse a range bound for history queries.
///
/// A bare `YYYY-MM-DD` means the start of that local day for a lower bound
/// and the end of it for an upper bound, so `--from d --to d` covers `d`.
///
/// # Errors
///
/// Returns a validation error if the value is not a date or timestamp.
pub fn parse_range_bound(s: &str, field_name: &str, upper: bool) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        let time = if upper {
            NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN)
        } else {
            NaiveTime::MIN
        };
        return local_day_at(date, time, field_name);
    }
    parse_flexible_timestamp(s, field_name)
}

/// Parse a stored RFC3339 timestamp.
///
/// Also accepts SQLite's `YYYY-MM-DD HH:MM:SS` form, read as UTC.
#[must_use]
pub fn parse_stored(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_flexible_rfc3339() {
        let result = parse_flexible_timestamp("2025-01-15T12:00:00Z", "due").unwrap();
        assert_eq!(result.year(), 2025);
        assert_eq!(result.hour(), 12);
    }

    #[test]
    fn test_parse_flexible_simple_date() {
        let result = parse_flexible_timestamp("2025-06-20", "due").unwrap();
        assert_eq!(result.year(), 2025);
        assert_eq!(result.month(), 6);
    }

    #[test]
    fn test_parse_flexible_relative_and_keywords() {
        assert!(parse_flexible_timestamp("+3d", "due").unwrap() > Utc::now());
        assert!(parse_flexible_timestamp("tomorrow", "due").unwrap() > Utc::now());
    }

    #[test]
    fn test_parse_flexible_rejects_garbage() {
        let err = parse_flexible_timestamp("soonish", "due").unwrap_err();
        assert!(err.to_string().contains("due"));
        assert!(parse_flexible_timestamp("+3y", "due").is_err());
    }

    #[test]
    fn test_range_bounds_cover_whole_day() {
        let from = parse_range_bound("2025-02-10", "from", false).unwrap();
        let to = parse_range_bound("2025-02-10", "to", true).unwrap();
        assert!(to - from > Duration::hours(23));
        assert_eq!(to.timestamp_subsec_micros(), 999_999);
    }

    #[test]
    fn test_parse_flexible_relative_overflow_is_validation_error() {
        for input in ["+100000000d", "+99999999999999w", "+9223372036854775807m"] {
            let err = parse_flexible_timestamp(input, "due").unwrap_err();
            assert!(
                matches!(err, DeskError::Validation { .. }),
                "{input}: {err:?}"
            );
            assert!(err.to_string().contains("out of range"), "{input}: {err}");
        }
    }

    #[test]
    fn test_parse_flexible_rejects_negative_offset() {
        assert!(parse_flexible_timestamp("+-3d", "due").is_err());
    }

    #[test]
    fn test_parse_stored_formats() {
        assert!(parse_stored("2025-01-15T12:00:00+00:00").is_some());
        assert!(parse_stored("2025-01-15 12:00:00").is_some());
        assert!(parse_stored("yesterday").is_none());
    }
}
