use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use crewline_core::adapter::{normalize_shifts, normalize_tasks};
use crewline_core::model::{DayRange, FixedClock, TimeRange};
use crewline_core::scroll::{ScrollPane, ScrollSync};
use crewline_core::views::{NowIndicator, PaneSize, compute_now_offset_px};
use crewline_core::{LayoutConfig, RefreshTicket, TimelineSession, ViewMode};
use crewline_protocol::SharedStr;
use wasm_bindgen::prelude::*;

fn js_err(err: impl Display) -> JsError {
    JsError::new(&err.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, JsError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| js_err(format!("{s:?}: {e}")))
}

/// `now_ms` is the host's wall clock in local time, as milliseconds since
/// the epoch (`Date.now() - offset * 60000`).
fn host_now(now_ms: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(now_ms as i64).map(|dt| dt.naive_utc())
}

/// The header pane as last written by us or reported by the page.
#[derive(Debug, Default)]
struct HeaderPane {
    scroll_x: f64,
}

impl ScrollPane for HeaderPane {
    fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    fn set_scroll_x(&mut self, x: f64) {
        self.scroll_x = x;
    }
}

/// One timeline on the page. The dashboard creates one per mounted view;
/// nothing is shared between handles.
#[wasm_bindgen]
pub struct Timeline {
    session: TimelineSession,
    sync: ScrollSync,
    header: HeaderPane,
    now: Option<NowIndicator>,
    today: Option<NaiveDate>,
    pane: PaneSize,
}

#[wasm_bindgen]
impl Timeline {
    /// `config_json` may be `"{}"` for defaults. `start`/`end` are the first
    /// visible days as `YYYY-MM-DD`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, start: &str, end: &str) -> Result<Timeline, JsError> {
        let config = LayoutConfig::from_json(config_json).map_err(js_err)?;
        let visible = DayRange::new(parse_date(start)?, parse_date(end)?).map_err(js_err)?;
        Ok(Self {
            session: TimelineSession::new(config, visible),
            sync: ScrollSync::new(),
            header: HeaderPane::default(),
            now: None,
            today: None,
            pane: PaneSize::new(0.0, 0.0),
        })
    }

    pub fn set_tasks(&mut self, json: &str) -> Result<usize, JsError> {
        let batch = normalize_tasks(json).map_err(js_err)?;
        let count = batch.items.len();
        self.session.set_items(batch.items);
        self.session.merge_owner_names(batch.owner_names);
        Ok(count)
    }

    pub fn set_shifts(&mut self, json: &str) -> Result<usize, JsError> {
        let batch = normalize_shifts(json).map_err(js_err)?;
        let count = batch.windows.len();
        self.session.set_windows(batch.windows);
        self.session.merge_owner_names(batch.owner_names);
        Ok(count)
    }

    /// Returns `true` when the range changed and records should be refetched.
    pub fn set_range(&mut self, start: &str, end: &str) -> Result<bool, JsError> {
        let visible = DayRange::new(parse_date(start)?, parse_date(end)?).map_err(js_err)?;
        Ok(self.session.on_viewport_change(visible))
    }

    /// Visible range as `[start, end]` JSON, after any scroll extension.
    pub fn visible_range(&self) -> String {
        let vp = self.session.viewport();
        format!(
            r#"["{}","{}"]"#,
            vp.visible_start().format("%Y-%m-%d"),
            vp.visible_end().format("%Y-%m-%d")
        )
    }

    pub fn generation(&self) -> u64 {
        self.session.generation()
    }

    pub fn begin_refresh(&self) -> u64 {
        self.session.begin_refresh().generation()
    }

    /// Install fetched records. Returns `false` if the viewport moved since
    /// `begin_refresh` and the records were dropped.
    pub fn complete_refresh(
        &mut self,
        ticket: u64,
        tasks_json: &str,
        shifts_json: &str,
    ) -> Result<bool, JsError> {
        let tasks = normalize_tasks(tasks_json).map_err(js_err)?;
        let shifts = normalize_shifts(shifts_json).map_err(js_err)?;
        let applied = self.session.complete_refresh(
            RefreshTicket::from_generation(ticket),
            tasks.items,
            shifts.windows,
        );
        if applied {
            self.session.merge_owner_names(tasks.owner_names);
            self.session.merge_owner_names(shifts.owner_names);
        }
        Ok(applied)
    }

    /// Host wall clock for the today column; see `render_hours` for units.
    pub fn set_now(&mut self, now_ms: f64) {
        self.today = host_now(now_ms).map(|now| now.date());
    }

    /// Multi-day view as render-command JSON.
    pub fn render_days(&mut self, width: f64, height: f64) -> Result<String, JsError> {
        self.pane = PaneSize::new(width, height);
        self.session.set_mode(ViewMode::Days);
        let today = self.today.unwrap_or(NaiveDate::MIN);
        let commands = self
            .session
            .render_commands(self.pane, today, None)
            .map_err(js_err)?;
        serde_json::to_string(&commands).map_err(js_err)
    }

    /// Hourly view of `date` as render-command JSON, with the now line for
    /// `now_ms` (local wall clock, milliseconds since the epoch).
    pub fn render_hours(
        &mut self,
        date: &str,
        width: f64,
        height: f64,
        now_ms: f64,
    ) -> Result<String, JsError> {
        let date = parse_date(date)?;
        self.pane = PaneSize::new(width, height);
        self.session.set_mode(ViewMode::Hours(date));

        let now = host_now(now_ms).ok_or_else(|| js_err("now_ms out of range"))?;
        self.today = Some(now.date());
        let clock = FixedClock(now);
        let scroll = self.session.hour_scroll_px();
        let indicator = self.now.get_or_insert_with(|| NowIndicator::new(date));
        if indicator.viewed_date() != date {
            indicator.set_viewed_date(date);
        }
        indicator.on_scroll(scroll, &clock, self.session.config());

        let commands = self
            .session
            .render_commands(self.pane, date, self.now.as_ref())
            .map_err(js_err)?;
        serde_json::to_string(&commands).map_err(js_err)
    }

    /// Positioned rows and items of the current view, for hit testing and
    /// popups on the page.
    pub fn layout_json(&mut self) -> Result<String, JsError> {
        let layout = self.session.layout().map_err(js_err)?;
        serde_json::to_string(layout).map_err(js_err)
    }

    /// Id of the item under a body-content point, if any.
    pub fn hit_test(&mut self, x: f64, y: f64) -> Result<Option<String>, JsError> {
        let hit = self.session.hit_test(x, y).map_err(js_err)?;
        Ok(hit.map(|p| p.item.id.to_string()))
    }

    /// Check a proposed slot against the owner's shift. Rejects with the
    /// reason as the error message.
    pub fn validate_placement(
        &self,
        owner: &str,
        date: &str,
        start: &str,
        end: &str,
    ) -> Result<(), JsError> {
        let date = parse_date(date)?;
        let proposed = TimeRange::parse(start, end).map_err(js_err)?;
        self.session
            .validate_placement(&SharedStr::from(owner), date, &proposed)
            .map_err(js_err)
    }

    /// Body scroll event. Returns `true` when the page must request an
    /// animation frame and call `on_frame`.
    pub fn on_body_scroll(&mut self, x: f64) -> bool {
        self.sync.on_driver_scroll(x)
    }

    /// Header scroll event. Returns `false` for the echo of our own write.
    pub fn on_header_scroll(&mut self, x: f64) -> bool {
        let propagate = self.sync.on_follower_scroll(x);
        self.header.scroll_x = x;
        propagate
    }

    /// Animation-frame callback. Returns the offset to apply to the header
    /// pane and body, or nothing if no scroll is pending. In the day view the
    /// returned offset already accounts for days prepended by infinite
    /// scrolling.
    pub fn on_frame(&mut self) -> Option<f64> {
        let header: &mut dyn ScrollPane = &mut self.header;
        let offset = self.sync.on_frame(Some(header))?;
        match self.session.mode() {
            ViewMode::Days => {
                self.session.on_scroll(offset, self.pane.body_width(self.session.config()));
                let adjusted = self.session.scroll_offset_px();
                if adjusted != offset {
                    self.header.scroll_x = adjusted;
                    self.sync.rebase(adjusted);
                }
                Some(adjusted)
            }
            ViewMode::Hours(_) => {
                self.session.set_hour_scroll(offset);
                Some(offset)
            }
        }
    }

    /// Pane x-coordinate of the now line for `date`, or nothing on other
    /// days.
    pub fn now_offset(&self, now_ms: f64, date: &str, scroll: f64) -> Option<f64> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let config = self.session.config();
        compute_now_offset_px(
            host_now(now_ms)?,
            date,
            config.hour_width_px,
            scroll,
            config.label_column_px,
        )
    }
}
