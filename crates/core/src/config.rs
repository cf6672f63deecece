use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Pixel metrics and scrolling behaviour shared by both timeline views.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of one day column in the multi-day view.
    pub day_width_px: f64,
    /// Width of one hour column in the hourly view.
    pub hour_width_px: f64,
    pub lane_height_px: f64,
    /// Vertical padding added below the last lane of each owner row.
    pub row_padding_px: f64,
    pub header_height_px: f64,
    /// Fixed column on the left holding owner names.
    pub label_column_px: f64,
    /// Horizontal inset on both ends of a day bar.
    pub bar_inset_px: f64,
    pub show_weekends: bool,
    /// Distance from either scroll edge that triggers loading more days.
    pub extend_threshold_px: f64,
    pub extend_days: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            day_width_px: 48.0,
            hour_width_px: 80.0,
            lane_height_px: 22.0,
            row_padding_px: 6.0,
            header_height_px: 32.0,
            label_column_px: 160.0,
            bar_inset_px: 2.0,
            show_weekends: true,
            extend_threshold_px: 200.0,
            extend_days: 14,
        }
    }
}

impl LayoutConfig {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
