use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crewline_protocol::{Point, Rect, RenderCommand, ThemeToken};

use super::bars::{self, OwnerNames, PaneSize};
use super::header::{self, begin_scrolled_pane, end_scrolled_pane, visible_columns};
use super::positioned::{self, PositionedItem, TimelineLayout};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::layout::{assign_lanes_with, lane_top, project_days};
use crate::model::{ItemSpan, ScheduleItem, ViewportState, WorkWindow, time_grid};

const LANE_GAP: f64 = 2.0;

/// Lay out every item touching the visible days on the multi-day grid.
///
/// An hour slot occupies its whole day column here, so lanes are packed on
/// day boundaries. Owners with a shift in range but no tasks still get a
/// row.
pub fn layout(
    viewport: &ViewportState,
    items: &[ScheduleItem],
    windows: &[WorkWindow],
    config: &LayoutConfig,
) -> Result<TimelineLayout> {
    let visible: Vec<ScheduleItem> = items
        .iter()
        .filter(|item| item.span.day_range().overlaps(&viewport.visible))
        .cloned()
        .collect();
    let lanes = assign_lanes_with(&visible, |item| {
        ItemSpan::Days(item.span.day_range()).interval()
    })?;

    let owners = positioned::owner_order(
        visible.iter().map(|item| &item.owner_id).chain(
            windows
                .iter()
                .filter(|w| viewport.visible.contains_date(w.date))
                .map(|w| &w.owner_id),
        ),
    );
    let rows = positioned::stack_rows(&owners, &lanes, config);
    let row_index: HashMap<&str, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.owner_id.as_str(), i))
        .collect();

    let mut placed = Vec::with_capacity(visible.len());
    for item in visible {
        let Some(&row) = row_index.get(item.owner_id.as_str()) else {
            continue;
        };
        let lane = lanes.lane(&item.id).unwrap_or(0);
        let span = project_days(
            &item.span.day_range(),
            viewport,
            config.day_width_px,
            config.bar_inset_px,
        );
        placed.push(PositionedItem {
            left_px: span.left_px,
            top_px: lane_top(rows[row].base_offset_px(config), lane, config.lane_height_px),
            width_px: span.width_px,
            height_px: config.lane_height_px - LANE_GAP,
            lane,
            outside_work_window: false,
            item,
        });
    }

    let content_height_px = rows.last().map_or(0.0, |row| row.top_px + row.height_px);
    tracing::debug!(
        items = placed.len(),
        rows = rows.len(),
        start = %viewport.visible_start(),
        end = %viewport.visible_end(),
        "laid out day view"
    );
    Ok(TimelineLayout {
        rows,
        items: placed,
        content_width_px: viewport.content_width_px(config.day_width_px),
        content_height_px,
    })
}

/// Draw the multi-day view: date header, tinted day columns, shift cells,
/// task bars and the owner column.
pub fn render(
    layout: &TimelineLayout,
    viewport: &ViewportState,
    windows: &[WorkWindow],
    names: &OwnerNames,
    config: &LayoutConfig,
    today: NaiveDate,
    pane: PaneSize,
) -> Vec<RenderCommand> {
    let scroll = viewport.scroll_offset_px;
    let body_width = pane.body_width(config);
    let body_height = layout.content_height_px.max(pane.body_height(config));
    let day_width = config.day_width_px;
    let columns = visible_columns(
        scroll,
        body_width,
        day_width,
        viewport.visible.len_days() as usize,
    );

    let mut commands = header::render_day_header(viewport, config, today, scroll, pane.width_px);
    commands.reserve(layout.items.len() * 2 + columns.len() * 2 + 16);

    commands.push(RenderCommand::BeginGroup {
        id: "day-body".into(),
        label: None,
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
        scroll,
    );

    for col in columns.clone() {
        let date = viewport.visible_start() + Duration::days(col as i64);
        let x = col as f64 * day_width;
        if date == today {
            commands.push(RenderCommand::fill(
                Rect::new(x, 0.0, day_width, body_height),
                ThemeToken::TodayColumn,
            ));
        } else if config.show_weekends && time_grid::is_weekend(date) {
            commands.push(RenderCommand::fill(
                Rect::new(x, 0.0, day_width, body_height),
                ThemeToken::WeekendColumn,
            ));
        }
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, body_height),
            color: ThemeToken::GridLine,
            width: 0.5,
        });
    }

    for window in windows {
        if !viewport.visible.contains_date(window.date) {
            continue;
        }
        let Some(row) = layout.row(&window.owner_id) else {
            continue;
        };
        let x = (window.date - viewport.visible_start()).num_days() as f64 * day_width;
        if bars::in_view(x, x + day_width, scroll, body_width) {
            commands.push(RenderCommand::fill(
                Rect::new(x, row.top_px, day_width, row.height_px),
                ThemeToken::WorkWindow,
            ));
        }
    }

    let visible_left = columns.start as f64 * day_width;
    let visible_right = columns.end as f64 * day_width;
    bars::push_row_separators(&mut commands, &layout.rows, visible_left, visible_right);

    for positioned in &layout.items {
        let right = positioned.left_px + positioned.width_px;
        if bars::in_view(positioned.left_px, right, scroll, body_width) {
            bars::push_bar(&mut commands, positioned);
        }
    }

    end_scrolled_pane(&mut commands);
    commands.push(RenderCommand::EndGroup);

    bars::push_owner_column(&mut commands, &layout.rows, names, config, pane);
    commands
}
