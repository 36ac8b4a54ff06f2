//! Calendar date handling for effective windows
//!
//! Allocation dates arrive as text, either plain calendar dates from a form
//! or full timestamps read back from storage. Everything is reduced to a
//! [`NaiveDate`] before comparison.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse allocation date text into a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (reduced to their UTC date) and
/// naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps. Returns `None` for anything
/// else, including impossible dates such as `2024-02-30`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use costsplit_common::dates::parse_date;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert_eq!(parse_date("2024-01-01"), Some(day));
/// assert_eq!(parse_date("2024-01-01T00:00:00.000Z"), Some(day));
/// assert_eq!(parse_date("not a date"), None);
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|timestamp| timestamp.date())
}

/// Position of a boundary within its calendar day.
///
/// Every allocation opening on a day is seen before any allocation closing
/// on that day, so a window ending on day X overlaps one starting on X but
/// not one starting on X + 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Opening,
    Closing,
}

/// A point on the sweep timeline.
///
/// `Unbounded` orders after every dated boundary and stands in for the end
/// of an open-ended allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Boundary {
    At { day: NaiveDate, phase: Phase },
    Unbounded,
}

/// Inclusive effective window of one allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveWindow {
    pub start: NaiveDate,
    /// Inclusive end, `None` when open-ended
    pub end: Option<NaiveDate>,
}

impl EffectiveWindow {
    /// Boundary at which the window starts counting
    pub fn opening(&self) -> Boundary {
        Boundary::At { day: self.start, phase: Phase::Opening }
    }

    /// Boundary after which the window stops counting
    ///
    /// Falls after every opening on the end day and before every opening
    /// on the following day.
    pub fn closing(&self) -> Boundary {
        match self.end {
            Some(day) => Boundary::At { day, phase: Phase::Closing },
            None => Boundary::Unbounded,
        }
    }

    /// Whether `day` falls inside the window (both ends inclusive)
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && self.end.map_or(true, |end| day <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_date("2024-06-30"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date("  2024-06-30 "), Some(ymd(2024, 6, 30)));
    }

    #[test]
    fn test_parse_timestamps() {
        assert_eq!(parse_date("2024-06-30T00:00:00.000Z"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date("2024-06-30T23:59:59Z"), Some(ymd(2024, 6, 30)));
        // Offsets are normalised to UTC before taking the date
        assert_eq!(parse_date("2024-07-01T05:00:00+10:00"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date("2024-06-30T08:15:00"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date("2024-06-30T08:15:00.250"), Some(ymd(2024, 6, 30)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_boundary_ordering() {
        let opening = |day| Boundary::At { day, phase: Phase::Opening };
        let closing = |day| Boundary::At { day, phase: Phase::Closing };

        assert!(closing(NaiveDate::MAX) < Boundary::Unbounded);
        assert!(opening(ymd(2024, 1, 10)) < closing(ymd(2024, 1, 10)));
        assert!(closing(ymd(2024, 1, 10)) < opening(ymd(2024, 1, 11)));
    }

    #[test]
    fn test_window_boundaries() {
        let closed = EffectiveWindow { start: ymd(2024, 1, 1), end: Some(ymd(2024, 1, 10)) };
        assert_eq!(closed.opening(), Boundary::At { day: ymd(2024, 1, 1), phase: Phase::Opening });
        assert_eq!(closed.closing(), Boundary::At { day: ymd(2024, 1, 10), phase: Phase::Closing });

        let open = EffectiveWindow { start: ymd(2024, 1, 1), end: None };
        assert_eq!(open.closing(), Boundary::Unbounded);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = EffectiveWindow { start: ymd(2024, 1, 1), end: Some(ymd(2024, 1, 10)) };
        assert!(window.contains(ymd(2024, 1, 1)));
        assert!(window.contains(ymd(2024, 1, 10)));
        assert!(!window.contains(ymd(2023, 12, 31)));
        assert!(!window.contains(ymd(2024, 1, 11)));

        let open = EffectiveWindow { start: ymd(2024, 1, 1), end: None };
        assert!(open.contains(ymd(9999, 12, 31)));
    }
}
