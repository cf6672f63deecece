//! Drawing helpers shared by the multi-day and hourly bodies.

use std::collections::HashMap;

use crewline_protocol::{Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken};

use super::positioned::{OwnerRow, PositionedItem};
use crate::config::LayoutConfig;

const FONT_SIZE: f64 = 10.0;
const MIN_LABEL_WIDTH: f64 = 30.0;
/// Approximate glyph width used to truncate labels.
const CHAR_WIDTH: f64 = 6.0;

/// Display names keyed by owner id. Rows fall back to the id.
pub type OwnerNames = HashMap<SharedStr, SharedStr>;

/// Drawable size of the whole view, header and label column included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneSize {
    pub width_px: f64,
    pub height_px: f64,
}

impl PaneSize {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    pub fn body_width(&self, config: &LayoutConfig) -> f64 {
        (self.width_px - config.label_column_px).max(0.0)
    }

    pub fn body_height(&self, config: &LayoutConfig) -> f64 {
        (self.height_px - config.header_height_px).max(0.0)
    }
}

/// Whether `[left, right)` intersects the horizontally visible slice of the
/// body content.
pub(crate) fn in_view(left: f64, right: f64, scroll_offset_px: f64, body_width_px: f64) -> bool {
    right > scroll_offset_px && left < scroll_offset_px + body_width_px
}

pub(crate) fn push_bar(commands: &mut Vec<RenderCommand>, positioned: &PositionedItem) {
    let item = &positioned.item;
    let rect = positioned.rect();
    let border = if positioned.outside_work_window {
        ThemeToken::OutsideWindowBorder
    } else {
        ThemeToken::Border
    };
    commands.push(RenderCommand::DrawRect {
        rect,
        color: item.status.theme_token(),
        border_color: Some(border),
        label: Some(SharedStr::from(format!("{} ({})", item.label, item.status))),
        item_id: Some(item.id.clone()),
    });

    if rect.w > MIN_LABEL_WIDTH {
        commands.push(RenderCommand::DrawText {
            position: Point::new(rect.x + 3.0, rect.y + rect.h / 2.0 + 4.0),
            text: truncate_label(&item.label, rect.w - 6.0),
            color: ThemeToken::TextPrimary,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
        });
    }
}

fn truncate_label(label: &SharedStr, width_px: f64) -> SharedStr {
    let max_chars = (width_px / CHAR_WIDTH).floor().max(0.0) as usize;
    if label.chars().count() <= max_chars {
        return label.clone();
    }
    if max_chars <= 1 {
        return SharedStr::from("…");
    }
    let truncated: String = label.chars().take(max_chars - 1).collect();
    SharedStr::from(format!("{truncated}…"))
}

pub(crate) fn push_row_separators(
    commands: &mut Vec<RenderCommand>,
    rows: &[OwnerRow],
    from_x: f64,
    to_x: f64,
) {
    for row in rows {
        let y = row.top_px + row.height_px;
        commands.push(RenderCommand::DrawLine {
            from: Point::new(from_x, y),
            to: Point::new(to_x, y),
            color: ThemeToken::GridLine,
            width: 0.5,
        });
    }
}

/// The fixed owner-name column left of the body, below the header.
pub(crate) fn push_owner_column(
    commands: &mut Vec<RenderCommand>,
    rows: &[OwnerRow],
    names: &OwnerNames,
    config: &LayoutConfig,
    pane: PaneSize,
) {
    let top = config.header_height_px;
    commands.push(RenderCommand::BeginGroup {
        id: "owners".into(),
        label: Some("Employees".into()),
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, top, config.label_column_px, pane.body_height(config)),
        color: ThemeToken::LabelColumnBackground,
        border_color: Some(ThemeToken::Border),
        label: None,
        item_id: None,
    });
    for row in rows {
        let y = top + row.top_px;
        if y > pane.height_px {
            break;
        }
        let name = names.get(&row.owner_id).unwrap_or(&row.owner_id);
        commands.push(RenderCommand::DrawText {
            position: Point::new(8.0, y + config.lane_height_px / 2.0 + 4.0),
            text: truncate_label(name, config.label_column_px - 16.0),
            color: ThemeToken::TextPrimary,
            font_size: FONT_SIZE + 1.0,
            align: TextAlign::Left,
        });
    }
    commands.push(RenderCommand::EndGroup);
}
