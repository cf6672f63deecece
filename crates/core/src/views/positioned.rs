use serde::Serialize;

use crewline_protocol::{Point, Rect, SharedStr};

use crate::config::LayoutConfig;
use crate::layout::LaneAssignment;
use crate::model::ScheduleItem;

/// A schedule item with its final geometry in body-content pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedItem {
    pub item: ScheduleItem,
    pub left_px: f64,
    pub top_px: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub lane: usize,
    /// Only set by the hourly view.
    pub outside_work_window: bool,
}

impl PositionedItem {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left_px, self.top_px, self.width_px, self.height_px)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.rect().contains(Point::new(x, y))
    }
}

/// One owner's horizontal band in the body pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerRow {
    pub owner_id: SharedStr,
    pub top_px: f64,
    pub height_px: f64,
    pub lanes: usize,
}

impl OwnerRow {
    /// Top of lane 0 inside this row.
    pub fn base_offset_px(&self, config: &LayoutConfig) -> f64 {
        self.top_px + config.row_padding_px / 2.0
    }
}

/// Result of a layout pass for either view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineLayout {
    pub rows: Vec<OwnerRow>,
    pub items: Vec<PositionedItem>,
    pub content_width_px: f64,
    pub content_height_px: f64,
}

impl TimelineLayout {
    pub fn row(&self, owner_id: &str) -> Option<&OwnerRow> {
        self.rows.iter().find(|row| row.owner_id == owner_id)
    }

    /// Topmost item under a body-content point. Later items are drawn on
    /// top, so they win.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&PositionedItem> {
        self.items.iter().rev().find(|p| p.contains(x, y))
    }
}

/// Stack one row per owner. Owners missing from `lanes` (e.g. someone with a
/// shift but no tasks) still get a single empty lane.
pub(crate) fn stack_rows(
    owners: &[SharedStr],
    lanes: &LaneAssignment,
    config: &LayoutConfig,
) -> Vec<OwnerRow> {
    let mut top = 0.0;
    owners
        .iter()
        .map(|owner| {
            let count = lanes.lane_count(owner);
            let height = count.max(1) as f64 * config.lane_height_px + config.row_padding_px;
            let row = OwnerRow {
                owner_id: owner.clone(),
                top_px: top,
                height_px: height,
                lanes: count,
            };
            top += height;
            row
        })
        .collect()
}

/// Owners in first-seen order across several id sources.
pub(crate) fn owner_order<'a>(ids: impl IntoIterator<Item = &'a SharedStr>) -> Vec<SharedStr> {
    let mut seen = std::collections::HashSet::new();
    let mut order = Vec::new();
    for id in ids {
        if seen.insert(id.as_str()) {
            order.push(id.clone());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::assign_lanes;

    #[test]
    fn rows_stack_by_lane_count() {
        let config = LayoutConfig {
            lane_height_px: 20.0,
            row_padding_px: 4.0,
            ..LayoutConfig::default()
        };
        let lanes = assign_lanes(&[]).unwrap();
        let owners: Vec<SharedStr> = vec!["a".into(), "b".into()];
        let rows = stack_rows(&owners, &lanes, &config);
        assert_eq!(rows[0].top_px, 0.0);
        assert_eq!(rows[0].height_px, 24.0);
        assert_eq!(rows[1].top_px, 24.0);
        assert_eq!(rows[1].base_offset_px(&config), 26.0);
    }

    #[test]
    fn owner_order_dedups_keeping_first() {
        let ids: Vec<SharedStr> = vec!["b".into(), "a".into(), "b".into(), "c".into()];
        let order = owner_order(&ids);
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
