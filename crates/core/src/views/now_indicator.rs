use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crewline_protocol::{Point, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::config::LayoutConfig;
use crate::model::Clock;
use crate::model::time_grid;

const LINE_WIDTH: f64 = 2.0;
const FONT_SIZE: f64 = 10.0;
const POLL_INTERVAL_MS: i64 = 1000;

/// Pane x-coordinate of "now" on the hourly grid of `viewed_date`, or
/// `None` when `now` falls on another day and the line should be hidden.
pub fn compute_now_offset_px(
    now: NaiveDateTime,
    viewed_date: NaiveDate,
    hour_width_px: f64,
    scroll_offset_px: f64,
    grid_origin_px: f64,
) -> Option<f64> {
    if !time_grid::is_today(viewed_date, now) {
        return None;
    }
    let hours = f64::from(now.hour())
        + f64::from(now.minute()) / 60.0
        + f64::from(now.second()) / 3600.0;
    Some(grid_origin_px + hours * hour_width_px - scroll_offset_px)
}

/// Live "now" line for the hourly view.
///
/// Callers drive it from a timer with [`NowIndicator::poll`] and from the
/// scroll synchronizer's frame callback with [`NowIndicator::on_scroll`].
#[derive(Debug, Clone)]
pub struct NowIndicator {
    viewed_date: NaiveDate,
    scroll_offset_px: f64,
    last_poll: Option<NaiveDateTime>,
    now: Option<NaiveDateTime>,
    offset_px: Option<f64>,
}

impl NowIndicator {
    pub fn new(viewed_date: NaiveDate) -> Self {
        Self {
            viewed_date,
            scroll_offset_px: 0.0,
            last_poll: None,
            now: None,
            offset_px: None,
        }
    }

    pub fn viewed_date(&self) -> NaiveDate {
        self.viewed_date
    }

    pub fn set_viewed_date(&mut self, date: NaiveDate) {
        self.viewed_date = date;
        self.last_poll = None;
    }

    /// Recompute if at least a second has passed since the last poll.
    /// Returns `true` when the offset was recomputed.
    pub fn poll(&mut self, clock: &dyn Clock, config: &LayoutConfig) -> bool {
        let now = clock.now();
        let due = self
            .last_poll
            .is_none_or(|last| (now - last).num_milliseconds() >= POLL_INTERVAL_MS);
        if due {
            self.recompute(now, config);
        }
        due
    }

    /// Recompute immediately for a new scroll offset.
    pub fn on_scroll(&mut self, scroll_offset_px: f64, clock: &dyn Clock, config: &LayoutConfig) {
        self.scroll_offset_px = scroll_offset_px;
        self.recompute(clock.now(), config);
    }

    pub fn offset_px(&self) -> Option<f64> {
        self.offset_px
    }

    fn recompute(&mut self, now: NaiveDateTime, config: &LayoutConfig) {
        self.last_poll = Some(now);
        self.now = Some(now);
        self.offset_px = compute_now_offset_px(
            now,
            self.viewed_date,
            config.hour_width_px,
            self.scroll_offset_px,
            config.label_column_px,
        );
    }

    /// A vertical line through header and body, plus a clock label in the
    /// header. Empty when hidden or scrolled under the label column.
    pub fn render(&self, pane_height_px: f64, config: &LayoutConfig) -> Vec<RenderCommand> {
        let (Some(x), Some(now)) = (self.offset_px, self.now) else {
            return Vec::new();
        };
        if x < config.label_column_px {
            return Vec::new();
        }
        vec![
            RenderCommand::DrawLine {
                from: Point::new(x, 0.0),
                to: Point::new(x, pane_height_px),
                color: ThemeToken::NowLine,
                width: LINE_WIDTH,
            },
            RenderCommand::DrawText {
                position: Point::new(x + 3.0, config.header_height_px - 4.0),
                text: SharedStr::from(time_grid::format_minutes(time_grid::minutes_of_day(now))),
                color: ThemeToken::NowLine,
                font_size: FONT_SIZE,
                align: TextAlign::Left,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FixedClock;
    use chrono::Duration;

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn hidden_on_other_days() {
        assert_eq!(compute_now_offset_px(at(4, 12, 0, 0), day(5), 80.0, 0.0, 0.0), None);
        assert_eq!(compute_now_offset_px(at(4, 23, 59, 59), day(3), 80.0, 0.0, 0.0), None);
    }

    #[test]
    fn stays_within_the_day_grid() {
        let width = 80.0;
        for (h, m, s) in [(0, 0, 0), (6, 30, 15), (12, 0, 0), (23, 59, 59)] {
            let x = compute_now_offset_px(at(4, h, m, s), day(4), width, 0.0, 0.0).unwrap();
            assert!((0.0..=24.0 * width).contains(&x), "{x} out of range");
        }
    }

    #[test]
    fn includes_seconds_origin_and_scroll() {
        let x = compute_now_offset_px(at(4, 10, 30, 36), day(4), 60.0, 100.0, 150.0).unwrap();
        // 10.51h * 60 = 630.6
        assert!((x - (150.0 + 630.6 - 100.0)).abs() < 1e-9);
    }

    #[test]
    fn polls_at_most_once_per_second() {
        let config = LayoutConfig::default();
        let mut clock = FixedClock(at(4, 9, 0, 0));
        let mut indicator = NowIndicator::new(day(4));

        assert!(indicator.poll(&clock, &config));
        clock.advance(Duration::milliseconds(400));
        assert!(!indicator.poll(&clock, &config));
        clock.advance(Duration::milliseconds(600));
        assert!(indicator.poll(&clock, &config));
    }

    #[test]
    fn scrolling_recomputes_immediately() {
        let config = LayoutConfig::default();
        let clock = FixedClock(at(4, 9, 0, 0));
        let mut indicator = NowIndicator::new(day(4));
        indicator.poll(&clock, &config);
        let before = indicator.offset_px().unwrap();

        indicator.on_scroll(40.0, &clock, &config);
        assert_eq!(indicator.offset_px(), Some(before - 40.0));
    }

    #[test]
    fn render_hides_line_behind_label_column() {
        let config = LayoutConfig::default();
        let clock = FixedClock(at(4, 1, 0, 0));
        let mut indicator = NowIndicator::new(day(4));
        indicator.poll(&clock, &config);
        assert_eq!(indicator.render(400.0, &config).len(), 2);

        // Scroll the 01:00 column under the fixed label column.
        indicator.on_scroll(config.hour_width_px * 2.0, &clock, &config);
        assert!(indicator.render(400.0, &config).is_empty());
    }

    #[test]
    fn changing_day_forces_recompute() {
        let config = LayoutConfig::default();
        let clock = FixedClock(at(4, 9, 0, 0));
        let mut indicator = NowIndicator::new(day(4));
        indicator.poll(&clock, &config);
        indicator.set_viewed_date(day(5));
        assert!(indicator.poll(&clock, &config));
        assert_eq!(indicator.offset_px(), None);
    }
}
