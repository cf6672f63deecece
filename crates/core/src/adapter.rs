//! Normalizes task and shift records exported from the scheduling tables.
//!
//! The tables grew their columns independently, so the same concept appears
//! under several names. Every spelling is resolved here and nowhere else.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crewline_protocol::SharedStr;

use crate::error::{Result, TimelineError};
use crate::model::{DayRange, ItemSpan, ScheduleItem, Status, TimeRange, WorkWindow, time_grid};
use crate::views::OwnerNames;

/// Ids arrive as strings from some tables and integers from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_shared(self) -> SharedStr {
        match self {
            RawId::Text(s) => SharedStr::from(s),
            RawId::Number(n) => SharedStr::from(n.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawTask {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, alias = "title", alias = "name")]
    label: Option<String>,
    #[serde(default, alias = "employee_id", alias = "assigned_to", alias = "ownerId")]
    owner_id: Option<RawId>,
    #[serde(default, alias = "employee_name", alias = "assignee_name")]
    owner_name: Option<String>,
    #[serde(default, alias = "start_date", alias = "task_date")]
    date: Option<NaiveDate>,
    #[serde(default, alias = "endDate")]
    end_date: Option<NaiveDate>,
    #[serde(default, alias = "startTime")]
    start_time: Option<String>,
    #[serde(default, alias = "endTime")]
    end_time: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawShift {
    #[serde(default, alias = "employee_id", alias = "ownerId")]
    owner_id: Option<RawId>,
    #[serde(default, alias = "employee_name")]
    owner_name: Option<String>,
    #[serde(default, alias = "shift_date", alias = "start_date")]
    date: Option<NaiveDate>,
    #[serde(default, alias = "startTime")]
    start_time: Option<String>,
    #[serde(default, alias = "endTime")]
    end_time: Option<String>,
}

/// Either a bare array or a `{ "data": [...] }` response envelope.
///
/// Records stay untyped here so that one malformed record fails on its own
/// instead of taking the whole document with it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Envelope { data: Vec<Value> },
    Array(Vec<Value>),
}

fn read_records(json: &str) -> Result<Vec<Value>> {
    Ok(match serde_json::from_str::<RecordFile>(json)? {
        RecordFile::Envelope { data } => data,
        RecordFile::Array(records) => records,
    })
}

fn decode_record<T: DeserializeOwned>(index: usize, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| TimelineError::Record {
        index,
        reason: e.to_string(),
    })
}

/// Normalized tasks plus any owner display names found along the way.
#[derive(Debug, Clone, Default)]
pub struct TaskBatch {
    pub items: Vec<ScheduleItem>,
    pub owner_names: OwnerNames,
}

#[derive(Debug, Clone, Default)]
pub struct ShiftBatch {
    pub windows: Vec<WorkWindow>,
    pub owner_names: OwnerNames,
}

/// Parse a time column: `HH:MM`, `HHMM`, or the database's `HH:MM:SS`.
/// Seconds are dropped.
pub fn parse_record_time(s: &str) -> Result<u32> {
    let trimmed = s.trim();
    let without_seconds = match trimmed.as_bytes() {
        [_, _, b':', _, _, b':', _, _] => &trimmed[..5],
        _ => trimmed,
    };
    time_grid::parse_time_of_day(without_seconds)
}

/// An end time of `00:00` (or `24:00`) after a later start means the range
/// runs to midnight.
fn parse_end_time(s: &str, start_minutes: u32) -> Result<u32> {
    let trimmed = s.trim();
    if matches!(trimmed, "24:00" | "2400" | "24:00:00") {
        return Ok(time_grid::MINUTES_PER_DAY);
    }
    let end = parse_record_time(trimmed)?;
    if end == 0 && start_minutes > 0 {
        Ok(time_grid::MINUTES_PER_DAY)
    } else {
        Ok(end)
    }
}

fn time_range(index: usize, start: &str, end: &str) -> Result<TimeRange> {
    let reason = |e: TimelineError| TimelineError::Record {
        index,
        reason: e.to_string(),
    };
    let start = parse_record_time(start).map_err(reason)?;
    let end = parse_end_time(end, start).map_err(reason)?;
    TimeRange::new(start, end).map_err(reason)
}

fn missing(index: usize, field: &str) -> TimelineError {
    TimelineError::Record {
        index,
        reason: format!("missing {field}"),
    }
}

fn record_name(names: &mut OwnerNames, owner: &SharedStr, name: Option<String>) {
    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        names
            .entry(owner.clone())
            .or_insert_with(|| SharedStr::from(name));
    }
}

fn task_to_item(index: usize, value: Value, names: &mut OwnerNames) -> Result<ScheduleItem> {
    let raw: RawTask = decode_record(index, value)?;
    let owner_id = raw.owner_id.ok_or_else(|| missing(index, "owner"))?.into_shared();
    let date = raw.date.ok_or_else(|| missing(index, "date"))?;
    let id = raw
        .id
        .map(RawId::into_shared)
        .unwrap_or_else(|| SharedStr::from(format!("task-{index}")));

    let single_day = raw.end_date.is_none_or(|end| end == date);
    let span = match (raw.start_time.as_deref(), raw.end_time.as_deref()) {
        (Some(start), Some(end)) if single_day => ItemSpan::Hours {
            date,
            range: time_range(index, start, end)?,
        },
        (Some(_), None) | (None, Some(_)) if single_day => {
            return Err(TimelineError::Record {
                index,
                reason: "start and end times must be given together".into(),
            });
        }
        _ => {
            let end = raw.end_date.unwrap_or(date);
            ItemSpan::Days(DayRange::new(date, end).map_err(|e| TimelineError::Record {
                index,
                reason: e.to_string(),
            })?)
        }
    };

    let status = match raw.status.as_deref() {
        None => Status::Pending,
        Some(s) => Status::parse(s).ok_or_else(|| TimelineError::Record {
            index,
            reason: format!("unknown status {s:?}"),
        })?,
    };

    record_name(names, &owner_id, raw.owner_name);
    Ok(ScheduleItem {
        label: raw.label.map_or_else(|| id.clone(), SharedStr::from),
        id,
        owner_id,
        span,
        status,
    })
}

fn shift_to_window(index: usize, value: Value, names: &mut OwnerNames) -> Result<WorkWindow> {
    let raw: RawShift = decode_record(index, value)?;
    let owner_id = raw.owner_id.ok_or_else(|| missing(index, "owner"))?.into_shared();
    let date = raw.date.ok_or_else(|| missing(index, "date"))?;
    let start = raw.start_time.ok_or_else(|| missing(index, "start_time"))?;
    let end = raw.end_time.ok_or_else(|| missing(index, "end_time"))?;
    let range = time_range(index, &start, &end)?;
    record_name(names, &owner_id, raw.owner_name);
    Ok(WorkWindow {
        owner_id,
        date,
        range,
    })
}

/// Normalize a task export.
///
/// Records that cannot be placed on the timeline are skipped with a
/// warning; the batch fails only if the document itself is not a record
/// array. Use [`normalize_tasks_strict`] to fail on the first bad record.
pub fn normalize_tasks(json: &str) -> Result<TaskBatch> {
    let records = read_records(json)?;
    let mut batch = TaskBatch::default();
    for (index, raw) in records.into_iter().enumerate() {
        match task_to_item(index, raw, &mut batch.owner_names) {
            Ok(item) => batch.items.push(item),
            Err(err) => tracing::warn!(%err, "skipping task record"),
        }
    }
    tracing::debug!(items = batch.items.len(), "normalized tasks");
    Ok(batch)
}

pub fn normalize_tasks_strict(json: &str) -> Result<TaskBatch> {
    let records = read_records(json)?;
    let mut batch = TaskBatch::default();
    for (index, raw) in records.into_iter().enumerate() {
        let item = task_to_item(index, raw, &mut batch.owner_names)?;
        batch.items.push(item);
    }
    Ok(batch)
}

/// Normalize a shift export into work windows. Bad records are skipped with
/// a warning, like [`normalize_tasks`].
pub fn normalize_shifts(json: &str) -> Result<ShiftBatch> {
    let records = read_records(json)?;
    let mut batch = ShiftBatch::default();
    for (index, raw) in records.into_iter().enumerate() {
        match shift_to_window(index, raw, &mut batch.owner_names) {
            Ok(window) => batch.windows.push(window),
            Err(err) => tracing::warn!(%err, "skipping shift record"),
        }
    }
    tracing::debug!(windows = batch.windows.len(), "normalized shifts");
    Ok(batch)
}
