use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::time_grid::{self, MINUTES_PER_DAY};
use crate::error::{Result, TimelineError};

/// A half-open span of minutes within one day: `[start, end)`.
///
/// `end` may be 1440 so a shift can run up to midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeRange {
    start_minutes: u32,
    end_minutes: u32,
}

impl TimeRange {
    pub fn new(start_minutes: u32, end_minutes: u32) -> Result<Self> {
        if start_minutes >= end_minutes || end_minutes > MINUTES_PER_DAY {
            return Err(TimelineError::invalid_range(
                time_grid::format_minutes(start_minutes),
                time_grid::format_minutes(end_minutes),
            ));
        }
        Ok(Self {
            start_minutes,
            end_minutes,
        })
    }

    /// Build from two `HHMM`/`HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(
            time_grid::parse_time_of_day(start)?,
            time_grid::parse_time_of_day(end)?,
        )
    }

    pub fn start_minutes(&self) -> u32 {
        self.start_minutes
    }

    pub fn end_minutes(&self) -> u32 {
        self.end_minutes
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_minutes - self.start_minutes
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_minutes < other.end_minutes && other.start_minutes < self.end_minutes
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start_minutes <= other.start_minutes && other.end_minutes <= self.end_minutes
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            time_grid::format_minutes(self.start_minutes),
            time_grid::format_minutes(self.end_minutes)
        )
    }
}

/// Whole days, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DayRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl DayRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if end_date < start_date {
            return Err(TimelineError::invalid_range(start_date, end_date));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start_date: date,
            end_date: date,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn len_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, other: &DayRange) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    pub fn days(&self) -> time_grid::DayIter {
        time_grid::DayIter::new(self.start_date, self.len_days() as usize)
    }

    pub fn extend_end(&self, days: i64) -> Self {
        Self {
            start_date: self.start_date,
            end_date: self.end_date + Duration::days(days.max(0)),
        }
    }

    pub fn extend_start(&self, days: i64) -> Self {
        Self {
            start_date: self.start_date - Duration::days(days.max(0)),
            end_date: self.end_date,
        }
    }

    /// Move both ends by `days`.
    pub fn shifted(&self, days: i64) -> Self {
        Self {
            start_date: self.start_date + Duration::days(days),
            end_date: self.end_date + Duration::days(days),
        }
    }
}

impl std::fmt::Display for DayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start_date, self.end_date)
    }
}

/// Where a schedule item sits in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemSpan {
    /// Whole days on the multi-day Gantt.
    Days(DayRange),
    /// A slot inside one day on the hourly view.
    Hours { date: NaiveDate, range: TimeRange },
}

impl ItemSpan {
    /// Half-open interval in absolute minutes (days since the common era
    /// times 1440 plus the minute of day). Day spans cover whole days, so
    /// `2024-03-01..=2024-03-01` is `[d, d + 1440)`.
    pub fn interval(&self) -> (i64, i64) {
        match self {
            ItemSpan::Days(days) => (
                day_origin(days.start_date),
                day_origin(days.end_date) + i64::from(MINUTES_PER_DAY),
            ),
            ItemSpan::Hours { date, range } => {
                let origin = day_origin(*date);
                (
                    origin + i64::from(range.start_minutes()),
                    origin + i64::from(range.end_minutes()),
                )
            }
        }
    }

    /// The days this span touches.
    pub fn day_range(&self) -> DayRange {
        match self {
            ItemSpan::Days(days) => *days,
            ItemSpan::Hours { date, .. } => DayRange::single(*date),
        }
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        match self {
            ItemSpan::Days(_) => None,
            ItemSpan::Hours { range, .. } => Some(*range),
        }
    }
}

fn day_origin(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) * i64::from(MINUTES_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn time_range_rejects_empty_and_reversed() {
        assert!(TimeRange::new(600, 600).is_err());
        assert!(TimeRange::new(700, 600).is_err());
        assert!(TimeRange::new(0, 1441).is_err());
        assert!(TimeRange::new(0, 1440).is_ok());
    }

    #[test]
    fn time_range_parse_propagates_format_errors() {
        let err = TimeRange::parse("9:00", "10:00").unwrap_err();
        assert!(matches!(err, TimelineError::InvalidTimeFormat(_)));
        let err = TimeRange::parse("10:00", "09:00").unwrap_err();
        assert!(matches!(err, TimelineError::InvalidRange { .. }));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let a = TimeRange::parse("09:00", "10:00").unwrap();
        let b = TimeRange::parse("10:00", "11:00").unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        let c = TimeRange::parse("09:59", "10:30").unwrap();
        assert!(a.overlaps(&c));
    }

    #[test]
    fn display_uses_clock_labels() {
        let r = TimeRange::parse("0900", "1730").unwrap();
        assert_eq!(r.to_string(), "09:00-17:30");
    }

    #[test]
    fn day_span_interval_covers_whole_days() {
        let span = ItemSpan::Days(DayRange::new(d(2024, 3, 1), d(2024, 3, 2)).unwrap());
        let (start, end) = span.interval();
        assert_eq!(end - start, 2 * 1440);

        let next = ItemSpan::Days(DayRange::single(d(2024, 3, 3)));
        assert_eq!(next.interval().0, end);
    }

    #[test]
    fn hour_spans_on_different_days_never_collide() {
        let range = TimeRange::parse("09:00", "17:00").unwrap();
        let mon = ItemSpan::Hours { date: d(2024, 3, 4), range };
        let tue = ItemSpan::Hours { date: d(2024, 3, 5), range };
        assert!(mon.interval().1 <= tue.interval().0);
    }

    #[test]
    fn day_range_shift_and_contains() {
        let r = DayRange::new(d(2024, 3, 1), d(2024, 3, 7)).unwrap();
        assert_eq!(r.len_days(), 7);
        assert!(r.contains_date(d(2024, 3, 7)));
        let shifted = r.shifted(7);
        assert_eq!(shifted.start_date(), d(2024, 3, 8));
        assert!(!r.overlaps(&shifted));
    }
}
