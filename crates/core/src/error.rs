use chrono::NaiveDate;
use thiserror::Error;

use crewline_protocol::SharedStr;

/// Every way the timeline engine can refuse its input.
///
/// Nothing here is retried or coerced: the caller decides whether to prompt
/// the user or drop the action.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid range: {start} is not before {end}")]
    InvalidRange { start: String, end: String },
    #[error("invalid time format: {0:?} (expected HHMM or HH:MM)")]
    InvalidTimeFormat(String),
    #[error("{owner} has no work window on {date}")]
    NoWorkWindow { owner: SharedStr, date: NaiveDate },
    #[error("{proposed} falls outside the work window {window}")]
    OutsideWorkWindow { proposed: String, window: String },
    #[error("duplicate schedule item id {0}")]
    DuplicateItem(SharedStr),
    #[error("record {index}: {reason}")]
    Record { index: usize, reason: String },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl TimelineError {
    pub(crate) fn invalid_range(start: impl ToString, end: impl ToString) -> Self {
        TimelineError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Whether the error is a placement-policy rejection rather than bad
    /// input. The dashboard shows these as warnings instead of errors.
    pub fn is_placement(&self) -> bool {
        matches!(
            self,
            TimelineError::NoWorkWindow { .. } | TimelineError::OutsideWorkWindow { .. }
        )
    }
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
