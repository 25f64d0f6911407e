use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Format of the canonical day key shared by availability lookups and storage.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT)
}

/// Collapse an instant to the calendar day it falls on in the reference zone.
///
/// Two instants on the same reference-zone day always yield the same key, no
/// matter which zone they were recorded in or what time of day they carry.
pub fn normalize_day<Tz, R>(instant: &DateTime<Tz>, reference: &R) -> NaiveDate
where
    Tz: TimeZone,
    R: TimeZone,
{
    instant.with_timezone(reference).date_naive()
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range from two days in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        let end = self.end;
        (0..=(end - start).num_days()).map(move |i| start + Duration::days(i))
    }
}

/// A calendar selection as the user builds it: first the start day, then the end day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSelection {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RangeSelection {
    pub fn starting(from: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn as_range(&self) -> Option<DateRange> {
        Some(DateRange {
            start: self.from?,
            end: self.to?,
        })
    }
}

/// Every calendar day from `from` to `to`, both included.
///
/// An absent or half-built selection expands to nothing, as does one whose end
/// precedes its start.
pub fn expand_range(range: Option<&RangeSelection>) -> Vec<NaiveDate> {
    range
        .and_then(RangeSelection::as_range)
        .map(|range| range.days().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_expand_range_is_inclusive() {
        let selection = RangeSelection::between(date(2024, 6, 28), date(2024, 7, 2));
        let days = expand_range(Some(&selection));

        assert_eq!(
            days,
            vec![
                date(2024, 6, 28),
                date(2024, 6, 29),
                date(2024, 6, 30),
                date(2024, 7, 1),
                date(2024, 7, 2),
            ]
        );
    }

    #[test]
    fn test_expand_range_is_idempotent() {
        let selection = RangeSelection::between(date(2024, 2, 27), date(2024, 3, 2));
        assert_eq!(expand_range(Some(&selection)), expand_range(Some(&selection)));
        // leap day included
        assert!(expand_range(Some(&selection)).contains(&date(2024, 2, 29)));
    }

    #[test]
    fn test_expand_incomplete_selection_is_empty() {
        assert!(expand_range(None).is_empty());
        assert!(expand_range(Some(&RangeSelection::default())).is_empty());
        assert!(expand_range(Some(&RangeSelection::starting(date(2024, 6, 1)))).is_empty());
    }

    #[test]
    fn test_expand_reversed_selection_is_empty() {
        let selection = RangeSelection::between(date(2024, 6, 5), date(2024, 6, 1));
        assert!(expand_range(Some(&selection)).is_empty());
    }

    #[test]
    fn test_same_day_expands_to_single_day() {
        let selection = RangeSelection::between(date(2024, 7, 1), date(2024, 7, 1));
        assert_eq!(expand_range(Some(&selection)), vec![date(2024, 7, 1)]);
    }

    #[test]
    fn test_normalize_day_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2024, 6, 10, 0, 5, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 6, 10, 23, 55, 0).unwrap();

        assert_eq!(normalize_day(&morning, &Utc), normalize_day(&evening, &Utc));
        assert_eq!(day_key(normalize_day(&morning, &Utc)), "2024-06-10");
    }

    #[test]
    fn test_normalize_day_uses_reference_zone() {
        // 23:30 in New York on the 9th is already the 10th in UTC
        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
        let late = new_york.with_ymd_and_hms(2024, 6, 9, 23, 30, 0).unwrap();

        assert_eq!(normalize_day(&late, &Utc), date(2024, 6, 10));
        assert_eq!(normalize_day(&late, &new_york), date(2024, 6, 9));
    }

    #[test]
    fn test_day_key_round_trip() {
        let day = date(2024, 1, 5);
        assert_eq!(day_key(day), "2024-01-05");
        assert_eq!(parse_day_key("2024-01-05").unwrap(), day);
        assert!(parse_day_key("05/01/2024").is_err());
    }
}
