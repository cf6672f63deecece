use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crewline_protocol::{SharedStr, ThemeToken};

use super::range::{ItemSpan, TimeRange};

/// Progress of a task or shift as recorded by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
    Overdue,
    OnHold,
    Cancelled,
    NoShow,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::Pending,
        Status::InProgress,
        Status::Completed,
        Status::Overdue,
        Status::OnHold,
        Status::Cancelled,
        Status::NoShow,
    ];

    /// Accepts the spellings found in exported records: `in-progress`,
    /// `in_progress`, `In Progress`, `inprogress`.
    pub fn parse(s: &str) -> Option<Status> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Some(match key.as_str() {
            "pending" => Status::Pending,
            "inprogress" => Status::InProgress,
            "completed" => Status::Completed,
            "overdue" => Status::Overdue,
            "onhold" => Status::OnHold,
            "cancelled" | "canceled" => Status::Cancelled,
            "noshow" => Status::NoShow,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
            Status::Overdue => "overdue",
            Status::OnHold => "on-hold",
            Status::Cancelled => "cancelled",
            Status::NoShow => "no-show",
        }
    }

    pub fn theme_token(&self) -> ThemeToken {
        match self {
            Status::Pending => ThemeToken::StatusPending,
            Status::InProgress => ThemeToken::StatusInProgress,
            Status::Completed => ThemeToken::StatusCompleted,
            Status::Overdue => ThemeToken::StatusOverdue,
            Status::OnHold => ThemeToken::StatusOnHold,
            Status::Cancelled => ThemeToken::StatusCancelled,
            Status::NoShow => ThemeToken::StatusNoShow,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One task or shift as the timeline sees it. Rebuilt from the record
/// source on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleItem {
    pub id: SharedStr,
    pub owner_id: SharedStr,
    pub span: ItemSpan,
    pub label: SharedStr,
    pub status: Status,
}

/// The hours an owner is scheduled to work on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkWindow {
    pub owner_id: SharedStr,
    pub date: NaiveDate,
    pub range: TimeRange,
}
