//! Fixed header panes above the timeline body.
//!
//! Headers are drawn in pane coordinates. The scrolled part is wrapped in a
//! transform by the header's own scroll offset, which the scroll
//! synchronizer keeps equal to the body's.

use chrono::{Datelike, Duration, NaiveDate};

use crewline_protocol::{Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::config::LayoutConfig;
use crate::model::{ViewportState, time_grid};

const FONT_SIZE: f64 = 11.0;
const SMALL_FONT_SIZE: f64 = 9.0;

/// Range of column indices intersecting `[scroll, scroll + width)`.
pub(crate) fn visible_columns(
    scroll_offset_px: f64,
    pane_width_px: f64,
    column_width_px: f64,
    column_count: usize,
) -> std::ops::Range<usize> {
    if column_width_px <= 0.0 || column_count == 0 {
        return 0..0;
    }
    let first = (scroll_offset_px / column_width_px).floor().max(0.0) as usize;
    let last = ((scroll_offset_px + pane_width_px) / column_width_px).ceil().max(0.0) as usize;
    first.min(column_count)..last.min(column_count)
}

pub(crate) fn begin_scrolled_pane(
    commands: &mut Vec<RenderCommand>,
    clip: Rect,
    origin_x: f64,
    origin_y: f64,
    scroll_offset_px: f64,
) {
    commands.push(RenderCommand::SetClip { rect: clip });
    commands.push(RenderCommand::PushTransform {
        translate: Point::new(origin_x - scroll_offset_px, origin_y),
    });
}

pub(crate) fn end_scrolled_pane(commands: &mut Vec<RenderCommand>) {
    commands.push(RenderCommand::PopTransform);
    commands.push(RenderCommand::ClearClip);
}

/// Date header for the multi-day view: one labelled cell per visible day,
/// weekends and today tinted.
pub fn render_day_header(
    viewport: &ViewportState,
    config: &LayoutConfig,
    today: NaiveDate,
    header_scroll_px: f64,
    pane_width_px: f64,
) -> Vec<RenderCommand> {
    let height = config.header_height_px;
    let body_width = (pane_width_px - config.label_column_px).max(0.0);
    let day_count = viewport.visible.len_days() as usize;
    let columns = visible_columns(header_scroll_px, body_width, config.day_width_px, day_count);

    let mut commands = Vec::with_capacity(columns.len() * 3 + 8);
    commands.push(RenderCommand::BeginGroup {
        id: "day-header".into(),
        label: Some("Dates".into()),
    });
    commands.push(RenderCommand::fill(
        Rect::new(0.0, 0.0, pane_width_px, height),
        ThemeToken::HeaderBackground,
    ));

    begin_scrolled_pane(
        &mut commands,
        Rect::new(config.label_column_px, 0.0, body_width, height),
        config.label_column_px,
        0.0,
        header_scroll_px,
    );
    for col in columns {
        let date = viewport.visible_start() + Duration::days(col as i64);
        let x = col as f64 * config.day_width_px;
        let tint = if date == today {
            Some(ThemeToken::TodayColumn)
        } else if config.show_weekends && time_grid::is_weekend(date) {
            Some(ThemeToken::WeekendColumn)
        } else {
            None
        };
        if let Some(tint) = tint {
            commands.push(RenderCommand::fill(
                Rect::new(x, 0.0, config.day_width_px, height),
                tint,
            ));
        }
        commands.push(RenderCommand::DrawText {
            position: Point::new(x + config.day_width_px / 2.0, height / 2.0 - 2.0),
            text: SharedStr::from(date.format("%a").to_string()),
            color: ThemeToken::TextMuted,
            font_size: SMALL_FONT_SIZE,
            align: TextAlign::Center,
        });
        let label = if date.day() == 1 {
            date.format("%b %-d").to_string()
        } else {
            date.day().to_string()
        };
        commands.push(RenderCommand::DrawText {
            position: Point::new(x + config.day_width_px / 2.0, height - 4.0),
            text: SharedStr::from(label),
            color: ThemeToken::HeaderText,
            font_size: FONT_SIZE,
            align: TextAlign::Center,
        });
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, height),
            color: ThemeToken::GridLine,
            width: 0.5,
        });
    }
    end_scrolled_pane(&mut commands);

    render_corner(&mut commands, config, "Employee");
    commands.push(RenderCommand::EndGroup);
    commands
}

/// Hour header for the single-day view: `00:00` to `23:00`.
pub fn render_hour_header(
    config: &LayoutConfig,
    header_scroll_px: f64,
    pane_width_px: f64,
) -> Vec<RenderCommand> {
    let height = config.header_height_px;
    let body_width = (pane_width_px - config.label_column_px).max(0.0);
    let columns = visible_columns(header_scroll_px, body_width, config.hour_width_px, 24);

    let mut commands = Vec::with_capacity(columns.len() * 2 + 8);
    commands.push(RenderCommand::BeginGroup {
        id: "hour-header".into(),
        label: Some("Hours".into()),
    });
    commands.push(RenderCommand::fill(
        Rect::new(0.0, 0.0, pane_width_px, height),
        ThemeToken::HeaderBackground,
    ));

    begin_scrolled_pane(
        &mut commands,
        Rect::new(config.label_column_px, 0.0, body_width, height),
        config.label_column_px,
        0.0,
        header_scroll_px,
    );
    for hour in columns {
        let x = hour as f64 * config.hour_width_px;
        commands.push(RenderCommand::DrawText {
            position: Point::new(x + 4.0, height - 8.0),
            text: SharedStr::from(time_grid::format_minutes(hour as u32 * 60)),
            color: ThemeToken::HeaderText,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
        });
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, height),
            color: ThemeToken::GridLine,
            width: 0.5,
        });
    }
    end_scrolled_pane(&mut commands);

    render_corner(&mut commands, config, "Employee");
    commands.push(RenderCommand::EndGroup);
    commands
}

fn render_corner(commands: &mut Vec<RenderCommand>, config: &LayoutConfig, title: &str) {
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, config.label_column_px, config.header_height_px),
        color: ThemeToken::LabelColumnBackground,
        border_color: Some(ThemeToken::Border),
        label: None,
        item_id: None,
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(8.0, config.header_height_px / 2.0 + 4.0),
        text: SharedStr::from(title),
        color: ThemeToken::HeaderText,
        font_size: FONT_SIZE,
        align: TextAlign::Left,
    });
}
