//! Common transport-layer types shared between the backend and the
//! engine crate, so filter and summary shapes exist in exactly one place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An inclusive creation-date window.
///
/// The end bound covers the whole named day, so a request created at
/// 23:00 on the end date is still inside the range. A missing bound
/// leaves that side unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    /// First day of the range (YYYY-MM-DD)
    pub start: Option<NaiveDate>,
    /// Last day of the range (YYYY-MM-DD), inclusive
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Whether the given instant falls inside the range.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if let Some(lower) = start.and_hms_opt(0, 0, 0) {
                if instant < lower.and_utc() {
                    return false;
                }
            }
        }
        if let Some(end) = self.end {
            // Extend the end bound to the last millisecond of that day
            if let Some(upper) = end.and_hms_milli_opt(23, 59, 59, 999) {
                if instant > upper.and_utc() {
                    return false;
                }
            }
        }
        true
    }
}

/// Per-status totals of the requests visible to the acting user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    /// Total visible requests
    pub total: u64,
    /// Requests awaiting a designer claim
    pub pending: u64,
    /// Requests currently being worked on
    pub in_progress: u64,
    /// Delivered requests
    pub done: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unbounded_range_contains_everything() {
        let range = DateRange::default();
        let instant = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        assert!(range.contains(instant));
    }

    #[test]
    fn end_bound_covers_the_whole_day() {
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        let late_on_last_day = Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert!(range.contains(late_on_last_day));
        assert!(!range.contains(next_day));
    }

    #[test]
    fn start_bound_is_inclusive_from_midnight() {
        let range = DateRange::new(Some(date(2024, 1, 1)), None);
        let at_midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert!(range.contains(at_midnight));
        assert!(!range.contains(before));
    }

    #[test]
    fn date_range_round_trips_through_json() {
        let range = DateRange::new(Some(date(2024, 1, 1)), None);
        let json = serde_json::to_string(&range).unwrap();
        let back: DateRange = serde_json::from_str(&json).unwrap();
        assert_eq!(range, back);
    }
}
