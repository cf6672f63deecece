use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::range::DayRange;
use crate::config::LayoutConfig;

/// What the user is currently looking at on the multi-day timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewportState {
    pub visible: DayRange,
    /// Horizontal scroll of the body pane, in content pixels.
    pub scroll_offset_px: f64,
}

/// Days added to the visible range by an infinite-scroll step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Forward(u32),
    Backward(u32),
}

impl ViewportState {
    pub fn new(visible: DayRange) -> Self {
        Self {
            visible,
            scroll_offset_px: 0.0,
        }
    }

    pub fn visible_start(&self) -> NaiveDate {
        self.visible.start_date()
    }

    pub fn visible_end(&self) -> NaiveDate {
        self.visible.end_date()
    }

    pub fn content_width_px(&self, day_width_px: f64) -> f64 {
        self.visible.len_days() as f64 * day_width_px
    }

    /// Replace the visible range. Returns `false` when nothing changed.
    pub fn set_range(&mut self, visible: DayRange) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        true
    }

    pub fn shift_days(&mut self, days: i64) {
        self.visible = self.visible.shifted(days);
    }

    /// Scroll so `date` sits at the left edge of the pane, recentring the
    /// range around it first if it is not visible.
    pub fn jump_to(&mut self, date: NaiveDate, pane_width_px: f64, day_width_px: f64) {
        if !self.visible.contains_date(date) {
            let half = self.visible.len_days() / 2;
            let start = date - Duration::days(half);
            self.visible = self.visible.shifted((start - self.visible_start()).num_days());
        }
        let left = (date - self.visible_start()).num_days() as f64 * day_width_px;
        let max = (self.content_width_px(day_width_px) - pane_width_px).max(0.0);
        self.scroll_offset_px = left.clamp(0.0, max);
    }

    /// Record a body scroll and grow the range when the pane nears either
    /// end of the content.
    ///
    /// Prepending days moves every existing column right, so the stored
    /// offset is shifted by the same amount to keep the view still.
    pub fn on_scroll(
        &mut self,
        offset_px: f64,
        pane_width_px: f64,
        config: &LayoutConfig,
    ) -> Option<Extension> {
        self.scroll_offset_px = offset_px.max(0.0);
        if config.extend_days == 0 {
            return None;
        }

        let content = self.content_width_px(config.day_width_px);
        let days = i64::from(config.extend_days);
        if self.scroll_offset_px + pane_width_px >= content - config.extend_threshold_px {
            self.visible = self.visible.extend_end(days);
            tracing::debug!(days, end = %self.visible_end(), "extended timeline forward");
            Some(Extension::Forward(config.extend_days))
        } else if self.scroll_offset_px <= config.extend_threshold_px {
            self.visible = self.visible.extend_start(days);
            self.scroll_offset_px += days as f64 * config.day_width_px;
            tracing::debug!(days, start = %self.visible_start(), "extended timeline backward");
            Some(Extension::Backward(config.extend_days))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn month() -> ViewportState {
        ViewportState::new(DayRange::new(d(2024, 3, 1), d(2024, 3, 31)).unwrap())
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            day_width_px: 10.0,
            extend_threshold_px: 20.0,
            extend_days: 7,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn set_range_reports_changes() {
        let mut vp = month();
        assert!(!vp.set_range(vp.visible));
        assert!(vp.set_range(DayRange::single(d(2024, 4, 1))));
    }

    #[test]
    fn scrolling_in_the_middle_does_not_extend() {
        let mut vp = month();
        assert_eq!(vp.on_scroll(100.0, 100.0, &config()), None);
        assert_eq!(vp.scroll_offset_px, 100.0);
        assert_eq!(vp.visible.len_days(), 31);
    }

    #[test]
    fn nearing_the_right_edge_appends_days() {
        let mut vp = month();
        // content = 310px, pane 100px: 195 + 100 >= 290
        assert_eq!(vp.on_scroll(195.0, 100.0, &config()), Some(Extension::Forward(7)));
        assert_eq!(vp.visible_end(), d(2024, 4, 7));
        assert_eq!(vp.visible_start(), d(2024, 3, 1));
        assert_eq!(vp.scroll_offset_px, 195.0);
    }

    #[test]
    fn nearing_the_left_edge_prepends_days_and_keeps_position() {
        let mut vp = month();
        assert_eq!(vp.on_scroll(10.0, 100.0, &config()), Some(Extension::Backward(7)));
        assert_eq!(vp.visible_start(), d(2024, 2, 23));
        // The column that was at 10px is now 70px further right.
        assert_eq!(vp.scroll_offset_px, 80.0);
    }

    #[test]
    fn extension_can_be_disabled() {
        let mut vp = month();
        let config = LayoutConfig {
            extend_days: 0,
            ..config()
        };
        assert_eq!(vp.on_scroll(0.0, 100.0, &config), None);
    }

    #[test]
    fn jump_to_recentres_outside_dates() {
        let mut vp = month();
        vp.jump_to(d(2024, 6, 15), 100.0, 10.0);
        assert!(vp.visible.contains_date(d(2024, 6, 15)));
        assert_eq!(vp.visible.len_days(), 31);
        let left = (d(2024, 6, 15) - vp.visible_start()).num_days() as f64 * 10.0;
        assert_eq!(vp.scroll_offset_px, left);
    }
}
