use std::collections::HashMap;

use chrono::NaiveDate;

use crewline_protocol::{Point, Rect, RenderCommand, ThemeToken};

use super::bars::{self, OwnerNames, PaneSize};
use super::header::{self, begin_scrolled_pane, end_scrolled_pane, visible_columns};
use super::now_indicator::NowIndicator;
use super::positioned::{self, PositionedItem, TimelineLayout};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::layout::{assign_lanes_with, lane_top, project_hours};
use crate::model::{ItemSpan, ScheduleItem, TimeRange, WorkWindow, time_grid};
use crate::placement::{find_work_window, validate_placement};

const LANE_GAP: f64 = 2.0;
const HOURS: usize = 24;

fn hours_of(item: &ScheduleItem) -> Option<TimeRange> {
    match &item.span {
        ItemSpan::Hours { range, .. } => Some(*range),
        // Whole-day tasks fill the full day grid.
        ItemSpan::Days(_) => TimeRange::new(0, time_grid::MINUTES_PER_DAY).ok(),
    }
}

/// Lay out the items of a single day on the 24-hour grid.
///
/// Hour slots outside their owner's work window are kept but flagged.
pub fn layout(
    date: NaiveDate,
    items: &[ScheduleItem],
    windows: &[WorkWindow],
    config: &LayoutConfig,
) -> Result<TimelineLayout> {
    let on_day: Vec<(ScheduleItem, TimeRange)> = items
        .iter()
        .filter(|item| item.span.day_range().contains_date(date))
        .filter_map(|item| hours_of(item).map(|range| (item.clone(), range)))
        .collect();
    let day_items: Vec<ScheduleItem> = on_day.iter().map(|(item, _)| item.clone()).collect();
    let ranges: HashMap<&str, TimeRange> = on_day
        .iter()
        .map(|(item, range)| (item.id.as_str(), *range))
        .collect();

    let lanes = assign_lanes_with(&day_items, |item| {
        ranges.get(item.id.as_str()).map_or((0, 0), |range| {
            (
                i64::from(range.start_minutes()),
                i64::from(range.end_minutes()),
            )
        })
    })?;

    let day_windows: Vec<&WorkWindow> = windows.iter().filter(|w| w.date == date).collect();
    let owners = positioned::owner_order(
        day_items
            .iter()
            .map(|item| &item.owner_id)
            .chain(day_windows.iter().map(|w| &w.owner_id)),
    );
    let rows = positioned::stack_rows(&owners, &lanes, config);
    let row_index: HashMap<&str, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.owner_id.as_str(), i))
        .collect();

    let mut placed = Vec::with_capacity(on_day.len());
    let mut flagged = 0usize;
    for (item, range) in on_day {
        let Some(&row) = row_index.get(item.owner_id.as_str()) else {
            continue;
        };
        let outside_work_window = match item.span {
            ItemSpan::Hours { .. } => validate_placement(
                &range,
                find_work_window(windows, &item.owner_id, date),
                &item.owner_id,
                date,
            )
            .is_err(),
            ItemSpan::Days(_) => false,
        };
        flagged += usize::from(outside_work_window);
        let lane = lanes.lane(&item.id).unwrap_or(0);
        let span = project_hours(&range, config.hour_width_px);
        placed.push(PositionedItem {
            left_px: span.left_px,
            top_px: lane_top(rows[row].base_offset_px(config), lane, config.lane_height_px),
            width_px: span.width_px,
            height_px: config.lane_height_px - LANE_GAP,
            lane,
            outside_work_window,
            item,
        });
    }

    if flagged > 0 {
        tracing::debug!(%date, flagged, "items outside their work window");
    }
    let content_height_px = rows.last().map_or(0.0, |row| row.top_px + row.height_px);
    Ok(TimelineLayout {
        rows,
        items: placed,
        content_width_px: HOURS as f64 * config.hour_width_px,
        content_height_px,
    })
}

/// Draw the single-day view. The now line, when given, goes on top of
/// everything else.
#[allow(clippy::too_many_arguments)]
pub fn render(
    layout: &TimelineLayout,
    date: NaiveDate,
    windows: &[WorkWindow],
    names: &OwnerNames,
    config: &LayoutConfig,
    scroll_offset_px: f64,
    now: Option<&NowIndicator>,
    pane: PaneSize,
) -> Vec<RenderCommand> {
    let body_width = pane.body_width(config);
    let body_height = layout.content_height_px.max(pane.body_height(config));
    let hour_width = config.hour_width_px;
    let columns = visible_columns(scroll_offset_px, body_width, hour_width, HOURS);

    let mut commands = header::render_hour_header(config, scroll_offset_px, pane.width_px);
    commands.reserve(layout.items.len() * 2 + HOURS + layout.rows.len() * 2 + 16);

    commands.push(RenderCommand::BeginGroup {
        id: "hour-body".into(),
        label: Some(date.format("%Y-%m-%d").to_string().into()),
    });
    begin_scrolled_pane(
        &mut commands,
        Rect::new(
            config.label_column_px,
            config.header_height_px,
            body_width,
            pane.body_height(config),
        ),
        config.label_column_px,
        config.header_height_px,
        scroll_offset_px,
    );

    for window in windows.iter().filter(|w| w.date == date) {
        let Some(row) = layout.row(&window.owner_id) else {
            continue;
        };
        let span = project_hours(&window.range, hour_width);
        if bars::in_view(span.left_px, span.right_px(), scroll_offset_px, body_width) {
            commands.push(RenderCommand::fill(
                Rect::new(span.left_px, row.top_px, span.width_px, row.height_px),
                ThemeToken::WorkWindow,
            ));
        }
    }

    for hour in columns.clone() {
        let x = hour as f64 * hour_width;
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, body_height),
            color: ThemeToken::GridLine,
            width: 0.5,
        });
    }
    bars::push_row_separators(
        &mut commands,
        &layout.rows,
        columns.start as f64 * hour_width,
        columns.end as f64 * hour_width,
    );

    for positioned in &layout.items {
        let right = positioned.left_px + positioned.width_px;
        if bars::in_view(positioned.left_px, right, scroll_offset_px, body_width) {
            bars::push_bar(&mut commands, positioned);
        }
    }

    end_scrolled_pane(&mut commands);
    commands.push(RenderCommand::EndGroup);

    bars::push_owner_column(&mut commands, &layout.rows, names, config, pane);
    if let Some(now) = now {
        commands.extend(now.render(pane.height_px, config));
    }
    commands
}
