//! Advisory checks run before a task placement is written back.

use chrono::NaiveDate;

use crewline_protocol::SharedStr;

use crate::error::{Result, TimelineError};
use crate::model::{TimeRange, WorkWindow};

/// Accept `proposed` only if it lies entirely inside `window`.
///
/// `owner` and `date` only feed the error message when there is no window.
pub fn validate_placement(
    proposed: &TimeRange,
    window: Option<&WorkWindow>,
    owner: &SharedStr,
    date: NaiveDate,
) -> Result<()> {
    let Some(window) = window else {
        return Err(TimelineError::NoWorkWindow {
            owner: owner.clone(),
            date,
        });
    };
    if proposed.start_minutes() < window.range.start_minutes()
        || proposed.end_minutes() > window.range.end_minutes()
    {
        return Err(TimelineError::OutsideWorkWindow {
            proposed: proposed.to_string(),
            window: window.range.to_string(),
        });
    }
    Ok(())
}

/// The work window of `owner` on `date`, if one was scheduled.
pub fn find_work_window<'a>(
    windows: &'a [WorkWindow],
    owner: &str,
    date: NaiveDate,
) -> Option<&'a WorkWindow> {
    windows
        .iter()
        .find(|w| w.date == date && w.owner_id == owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn window(start: u32, end: u32) -> WorkWindow {
        WorkWindow {
            owner_id: "emp-1".into(),
            date: date(),
            range: TimeRange::new(start, end).unwrap(),
        }
    }

    fn check(proposed: (u32, u32), window: Option<&WorkWindow>) -> Result<()> {
        let proposed = TimeRange::new(proposed.0, proposed.1).unwrap();
        validate_placement(&proposed, window, &"emp-1".into(), date())
    }

    #[test]
    fn starting_before_the_window_is_rejected() {
        let err = check((800, 900), Some(&window(900, 1700))).unwrap_err();
        assert!(matches!(err, TimelineError::OutsideWorkWindow { .. }));
        assert!(err.is_placement());
    }

    #[test]
    fn ending_after_the_window_is_rejected() {
        let err = check((1600, 1701), Some(&window(900, 1700))).unwrap_err();
        assert!(matches!(err, TimelineError::OutsideWorkWindow { .. }));
    }

    #[test]
    fn missing_window_is_rejected() {
        let err = check((1000, 1100), None).unwrap_err();
        assert!(matches!(err, TimelineError::NoWorkWindow { ref owner, .. } if owner == "emp-1"));
    }

    #[test]
    fn inside_and_exactly_matching_placements_pass() {
        assert!(check((1000, 1100), Some(&window(900, 1700))).is_ok());
        assert!(check((900, 1700), Some(&window(900, 1700))).is_ok());
    }

    #[test]
    fn lookup_matches_owner_and_date() {
        let mut other_day = window(600, 1200);
        other_day.date = date().succ_opt().unwrap();
        let windows = vec![other_day, window(900, 1700)];
        let found = find_work_window(&windows, "emp-1", date()).unwrap();
        assert_eq!(found.range.start_minutes(), 900);
        assert!(find_work_window(&windows, "emp-2", date()).is_none());
    }
}
