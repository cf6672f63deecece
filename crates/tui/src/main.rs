mod app;
mod renderer;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use chrono::{Duration, Local, NaiveDate};
use crewline_core::adapter::{normalize_shifts, normalize_tasks};
use crewline_core::model::{DayRange, ScheduleItem};
use crewline_core::{LayoutConfig, TimelineSession, ViewMode};

const USAGE: &str =
    "Usage: crewline <tasks.json> [shifts.json] [--config <file>] [--hours YYYY-MM-DD]";
const VISIBLE_DAYS: i64 = 28;

#[derive(Debug, Default, PartialEq)]
struct Args {
    tasks: PathBuf,
    shifts: Option<PathBuf>,
    config: Option<PathBuf>,
    hours: Option<NaiveDate>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut positional = Vec::new();
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a file")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--hours" => {
                let date = args.next().context("--hours needs a date")?;
                parsed.hours = Some(
                    NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                        .with_context(|| format!("invalid --hours date {date:?}"))?,
                );
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let mut positional = positional.into_iter();
    parsed.tasks = positional.next().context(USAGE)?;
    parsed.shifts = positional.next();
    if positional.next().is_some() {
        bail!(USAGE);
    }
    Ok(parsed)
}

/// Metrics that land bars and header labels on whole terminal cells.
fn terminal_config() -> LayoutConfig {
    LayoutConfig {
        day_width_px: 48.0,
        hour_width_px: 64.0,
        lane_height_px: 16.0,
        row_padding_px: 0.0,
        header_height_px: 32.0,
        label_column_px: 128.0,
        bar_inset_px: 0.0,
        ..LayoutConfig::default()
    }
}

/// Start at the earliest item so something is on screen; fall back to today.
fn initial_range(items: &[ScheduleItem], today: NaiveDate) -> Result<DayRange> {
    let start = items
        .iter()
        .map(|item| item.span.day_range().start_date())
        .min()
        .unwrap_or(today);
    Ok(DayRange::new(start, start + Duration::days(VISIBLE_DAYS - 1))?)
}

/// Logs go to the file named by `CREWLINE_LOG`; the terminal belongs to the
/// UI.
fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("CREWLINE_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(1);
        }
    };
    init_logging()?;

    let config = match &args.config {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            LayoutConfig::from_json(&data)?
        }
        None => terminal_config(),
    };

    let data = std::fs::read_to_string(&args.tasks)
        .with_context(|| format!("reading {}", args.tasks.display()))?;
    let tasks = normalize_tasks(&data)?;
    let shifts = match &args.shifts {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            normalize_shifts(&data)?
        }
        None => Default::default(),
    };
    tracing::info!(
        tasks = tasks.items.len(),
        shifts = shifts.windows.len(),
        "loaded records"
    );

    let today = Local::now().date_naive();
    let range = initial_range(&tasks.items, today)?;
    let mut session = TimelineSession::new(config, range);
    session.set_records(tasks.items, shifts.windows);
    session.merge_owner_names(tasks.owner_names);
    session.merge_owner_names(shifts.owner_names);
    if let Some(date) = args.hours {
        session.set_mode(ViewMode::Hours(date));
    }

    app::run(app::App::new(session, args.hours.unwrap_or(today)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(ToString::to_string))
    }

    #[test]
    fn parses_positionals_and_flags() {
        let parsed = args(&["tasks.json", "--hours", "2024-03-04", "shifts.json"]).unwrap();
        assert_eq!(parsed.tasks, PathBuf::from("tasks.json"));
        assert_eq!(parsed.shifts, Some(PathBuf::from("shifts.json")));
        assert_eq!(parsed.hours, NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(parsed.config, None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.json", "--hours", "March 4"]).is_err());
        assert!(args(&["a.json", "--zoom", "2"]).is_err());
        assert!(args(&["a.json", "b.json", "c.json"]).is_err());
    }

    #[test]
    fn range_starts_at_the_earliest_item() {
        let json = r#"[
            {"id": "b", "owner_id": "e1", "date": "2024-03-09"},
            {"id": "a", "owner_id": "e1", "date": "2024-03-02", "end_date": "2024-03-05"}
        ]"#;
        let items = normalize_tasks(json).unwrap().items;
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let range = initial_range(&items, today).unwrap();
        assert_eq!(range.start_date(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(range.len_days(), VISIBLE_DAYS);

        assert_eq!(initial_range(&[], today).unwrap().start_date(), today);
    }
}
