//! Calendar and clock arithmetic for the timeline grids.
//!
//! Days are `chrono::NaiveDate`; times of day are whole minutes since
//! midnight. None of these functions read the wall clock.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::error::{Result, TimelineError};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Inclusive number of days from `start` to `end` (a single day is 1).
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Result<i64> {
    if end < start {
        return Err(TimelineError::invalid_range(start, end));
    }
    Ok((end - start).num_days() + 1)
}

/// Every date from `start` to `end` inclusive, ascending.
pub fn enumerate_days(start: NaiveDate, end: NaiveDate) -> Result<DayIter> {
    let len = days_between(start, end)?;
    Ok(DayIter::new(start, len as usize))
}

/// Iterator returned by [`enumerate_days`]. Clone it to walk the range again.
#[derive(Debug, Clone)]
pub struct DayIter {
    next: NaiveDate,
    remaining: usize,
}

impl DayIter {
    pub(crate) fn new(start: NaiveDate, len: usize) -> Self {
        Self {
            next: start,
            remaining: len,
        }
    }
}

impl Iterator for DayIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.remaining == 0 {
            return None;
        }
        let day = self.next;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.next = day + Duration::days(1);
        }
        Some(day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for DayIter {}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_today(date: NaiveDate, reference_now: NaiveDateTime) -> bool {
    date == reference_now.date()
}

/// Parse `"HHMM"` or `"HH:MM"` into minutes since midnight.
///
/// Exactly two hour digits and two minute digits are required; anything
/// else, including surrounding whitespace and `"24:00"`, is rejected.
pub fn parse_time_of_day(s: &str) -> Result<u32> {
    let invalid = || TimelineError::InvalidTimeFormat(s.to_string());

    let bytes = s.as_bytes();
    let (hh, mm) = match bytes.len() {
        4 => (&bytes[..2], &bytes[2..]),
        5 if bytes[2] == b':' => (&bytes[..2], &bytes[3..]),
        _ => return Err(invalid()),
    };
    let hour = two_digits(hh).ok_or_else(invalid)?;
    let minute = two_digits(mm).ok_or_else(invalid)?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok(hour * 60 + minute)
}

fn two_digits(pair: &[u8]) -> Option<u32> {
    match pair {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

/// Format minutes since midnight as `"HH:MM"`. `1440` renders as `"24:00"`
/// so a range ending at midnight keeps a readable label.
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Minutes since midnight of a date-time, ignoring seconds.
pub fn minutes_of_day(at: NaiveDateTime) -> u32 {
    at.hour() * 60 + at.minute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn days_between_is_inclusive() {
        assert_eq!(days_between(d(2024, 3, 4), d(2024, 3, 4)).unwrap(), 1);
        assert_eq!(days_between(d(2024, 3, 4), d(2024, 3, 10)).unwrap(), 7);
        // Crosses the leap day.
        assert_eq!(days_between(d(2024, 2, 28), d(2024, 3, 1)).unwrap(), 3);
    }

    #[test]
    fn days_between_rejects_reversed_range() {
        let err = days_between(d(2024, 3, 5), d(2024, 3, 4)).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidRange { .. }));
    }

    #[test]
    fn enumerate_days_is_ordered_and_restartable() {
        let days = enumerate_days(d(2024, 12, 30), d(2025, 1, 2)).unwrap();
        assert_eq!(days.len(), 4);
        let first: Vec<_> = days.clone().collect();
        let second: Vec<_> = days.collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![d(2024, 12, 30), d(2024, 12, 31), d(2025, 1, 1), d(2025, 1, 2)]
        );
    }

    #[test]
    fn enumerate_days_ending_at_max_date() {
        let days: Vec<_> = enumerate_days(NaiveDate::MAX, NaiveDate::MAX)
            .unwrap()
            .collect();
        assert_eq!(days, vec![NaiveDate::MAX]);
    }

    #[test]
    fn weekend_and_today() {
        // 2024-03-09 is a Saturday.
        assert!(is_weekend(d(2024, 3, 9)));
        assert!(is_weekend(d(2024, 3, 10)));
        assert!(!is_weekend(d(2024, 3, 11)));

        let now = d(2024, 3, 11).and_hms_opt(23, 59, 59).unwrap();
        assert!(is_today(d(2024, 3, 11), now));
        assert!(!is_today(d(2024, 3, 12), now));
    }

    #[rstest]
    #[case("0000", 0)]
    #[case("00:00", 0)]
    #[case("0930", 570)]
    #[case("09:30", 570)]
    #[case("23:59", 1439)]
    #[case("1200", 720)]
    fn parses_valid_times(#[case] input: &str, #[case] expected: u32) {
        assert_eq!(parse_time_of_day(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("9:30")]
    #[case("930")]
    #[case("09-30")]
    #[case("0a:30")]
    #[case("24:00")]
    #[case("2400")]
    #[case("12:60")]
    #[case(" 09:30")]
    #[case("09:30:00")]
    #[case("+9:30")]
    fn rejects_malformed_times(#[case] input: &str) {
        let err = parse_time_of_day(input).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidTimeFormat(ref s) if s == input));
    }

    #[test]
    fn every_valid_time_round_trips() {
        for hour in 0..24 {
            for minute in 0..60 {
                let s = format!("{hour:02}:{minute:02}");
                assert_eq!(format_minutes(parse_time_of_day(&s).unwrap()), s);
            }
        }
    }

    #[test]
    fn midnight_end_formats_as_24() {
        assert_eq!(format_minutes(MINUTES_PER_DAY), "24:00");
    }
}
