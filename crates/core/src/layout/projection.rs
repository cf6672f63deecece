use serde::Serialize;

use crate::model::{DayRange, TimeRange, ViewportState};

/// Horizontal placement of a bar in content pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelSpan {
    pub left_px: f64,
    pub width_px: f64,
}

impl PixelSpan {
    pub fn right_px(&self) -> f64 {
        self.left_px + self.width_px
    }
}

/// Project whole days onto the multi-day grid.
///
/// Column 0 is `viewport.visible_start()`; ranges that start before it get
/// a negative `left_px`. `inset_px` is trimmed from both ends so adjacent
/// bars stay visually apart.
pub fn project_days(
    range: &DayRange,
    viewport: &ViewportState,
    unit_width_px: f64,
    inset_px: f64,
) -> PixelSpan {
    let offset_days = (range.start_date() - viewport.visible_start()).num_days();
    PixelSpan {
        left_px: offset_days as f64 * unit_width_px + inset_px,
        width_px: range.len_days() as f64 * unit_width_px - 2.0 * inset_px,
    }
}

/// Project a time of day onto the hourly grid.
pub fn project_hours(range: &TimeRange, hour_width_px: f64) -> PixelSpan {
    PixelSpan {
        left_px: f64::from(range.start_minutes()) / 60.0 * hour_width_px,
        width_px: f64::from(range.duration_minutes()) / 60.0 * hour_width_px,
    }
}

pub fn lane_top(base_offset_px: f64, lane: usize, lane_height_px: f64) -> f64 {
    base_offset_px + lane as f64 * lane_height_px
}
