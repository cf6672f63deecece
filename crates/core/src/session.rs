//! One dashboard's timeline state: the loaded records, the viewport and the
//! cached layout.
//!
//! Records are fetched asynchronously by the host. Each fetch is tagged with
//! a [`RefreshTicket`]; any viewport change bumps the session generation so
//! a fetch started for an older range is dropped instead of overwriting
//! newer data.

use chrono::NaiveDate;

use crewline_protocol::{RenderCommand, SharedStr};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::model::{DayRange, Extension, ScheduleItem, TimeRange, ViewportState, WorkWindow};
use crate::placement;
use crate::views::{
    NowIndicator, OwnerNames, PaneSize, PositionedItem, TimelineLayout, day_gantt, hourly_gantt,
};

/// Which of the two views the session lays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Days,
    Hours(NaiveDate),
}

/// Handed out when a fetch starts; redeemed when its records arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rebuild a ticket that crossed an FFI boundary as a plain number.
    pub fn from_generation(generation: u64) -> Self {
        Self { generation }
    }
}

#[derive(Debug, Clone)]
pub struct TimelineSession {
    config: LayoutConfig,
    viewport: ViewportState,
    mode: ViewMode,
    hour_scroll_px: f64,
    generation: u64,
    items: Vec<ScheduleItem>,
    windows: Vec<WorkWindow>,
    names: OwnerNames,
    layout: Option<TimelineLayout>,
}

impl TimelineSession {
    pub fn new(config: LayoutConfig, visible: DayRange) -> Self {
        Self {
            config,
            viewport: ViewportState::new(visible),
            mode: ViewMode::Days,
            hour_scroll_px: 0.0,
            generation: 0,
            items: Vec::new(),
            windows: Vec::new(),
            names: OwnerNames::new(),
            layout: None,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn items(&self) -> &[ScheduleItem] {
        &self.items
    }

    pub fn windows(&self) -> &[WorkWindow] {
        &self.windows
    }

    pub fn owner_names(&self) -> &OwnerNames {
        &self.names
    }

    pub fn hour_scroll_px(&self) -> f64 {
        self.hour_scroll_px
    }

    /// Scroll offset of the body pane of the current view.
    pub fn scroll_offset_px(&self) -> f64 {
        match self.mode {
            ViewMode::Days => self.viewport.scroll_offset_px,
            ViewMode::Hours(_) => self.hour_scroll_px,
        }
    }

    fn invalidate(&mut self) {
        self.layout = None;
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
        self.invalidate();
    }

    /// Replace the records wholesale, bypassing the ticket check. Used for
    /// synchronous sources such as files on disk.
    pub fn set_records(&mut self, items: Vec<ScheduleItem>, windows: Vec<WorkWindow>) {
        self.items = items;
        self.windows = windows;
        self.invalidate();
    }

    pub fn set_items(&mut self, items: Vec<ScheduleItem>) {
        self.items = items;
        self.invalidate();
    }

    pub fn set_windows(&mut self, windows: Vec<WorkWindow>) {
        self.windows = windows;
        self.invalidate();
    }

    /// Add display names; names already known are kept.
    pub fn merge_owner_names(&mut self, names: OwnerNames) {
        for (owner, name) in names {
            self.names.entry(owner).or_insert(name);
        }
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket {
            generation: self.generation,
        }
    }

    /// Install the records of a finished fetch. Returns `false`, leaving the
    /// session untouched, when the viewport moved since the fetch began.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        items: Vec<ScheduleItem>,
        windows: Vec<WorkWindow>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::warn!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale refresh"
            );
            return false;
        }
        self.set_records(items, windows);
        true
    }

    /// Show `visible` on the day view. Idempotent: the generation only moves
    /// when the range actually changes.
    pub fn on_viewport_change(&mut self, visible: DayRange) -> bool {
        if !self.viewport.set_range(visible) {
            return false;
        }
        self.bump_generation();
        true
    }

    /// Feed a day-view body scroll. When the range grows, the caller should
    /// start a refresh for the new days.
    pub fn on_scroll(&mut self, offset_px: f64, pane_width_px: f64) -> Option<Extension> {
        let extension = self.viewport.on_scroll(offset_px, pane_width_px, &self.config);
        if extension.is_some() {
            self.bump_generation();
        }
        extension
    }

    pub fn set_hour_scroll(&mut self, offset_px: f64) {
        self.hour_scroll_px = offset_px.max(0.0);
    }

    pub fn shift_days(&mut self, days: i64) {
        if days != 0 {
            self.viewport.shift_days(days);
            self.bump_generation();
        }
    }

    pub fn jump_to(&mut self, date: NaiveDate, pane_width_px: f64) {
        let before = self.viewport.visible;
        self.viewport
            .jump_to(date, pane_width_px, self.config.day_width_px);
        if self.viewport.visible != before {
            self.bump_generation();
        }
    }

    /// Switch views. A different view (or another day in the hourly view)
    /// needs different records, so this counts as a viewport change.
    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            self.mode = mode;
            self.bump_generation();
        }
    }

    fn compute_layout(&self) -> Result<TimelineLayout> {
        match self.mode {
            ViewMode::Days => day_gantt::layout(&self.viewport, &self.items, &self.windows, &self.config),
            ViewMode::Hours(date) => hourly_gantt::layout(date, &self.items, &self.windows, &self.config),
        }
    }

    /// Layout of the current view, recomputed only after something changed.
    pub fn layout(&mut self) -> Result<&TimelineLayout> {
        if self.layout.is_none() {
            let layout = self.compute_layout()?;
            tracing::debug!(
                generation = self.generation,
                items = layout.items.len(),
                rows = layout.rows.len(),
                "recomputed timeline layout"
            );
            self.layout = Some(layout);
        }
        Ok(self.layout.get_or_insert_with(TimelineLayout::default))
    }

    /// Positioned items of the current view.
    pub fn render(&mut self) -> Result<&[PositionedItem]> {
        Ok(self.layout()?.items.as_slice())
    }

    /// Draw the current view. `today` tints the day view; `now` draws the
    /// live line on the hourly view.
    pub fn render_commands(
        &mut self,
        pane: PaneSize,
        today: NaiveDate,
        now: Option<&NowIndicator>,
    ) -> Result<Vec<RenderCommand>> {
        self.layout()?;
        let Some(layout) = self.layout.as_ref() else {
            return Ok(Vec::new());
        };
        let commands = match self.mode {
            ViewMode::Days => day_gantt::render(
                layout,
                &self.viewport,
                &self.windows,
                &self.names,
                &self.config,
                today,
                pane,
            ),
            ViewMode::Hours(date) => hourly_gantt::render(
                layout,
                date,
                &self.windows,
                &self.names,
                &self.config,
                self.hour_scroll_px,
                now,
                pane,
            ),
        };
        tracing::debug!(commands = commands.len(), "rendered timeline");
        Ok(commands)
    }

    /// The item under a body-content point of the current view.
    pub fn hit_test(&mut self, x: f64, y: f64) -> Result<Option<&PositionedItem>> {
        Ok(self.layout()?.hit_test(x, y))
    }

    /// Check a proposed slot against the owner's work window for `date`.
    pub fn validate_placement(
        &self,
        owner: &SharedStr,
        date: NaiveDate,
        proposed: &TimeRange,
    ) -> Result<()> {
        let window = placement::find_work_window(&self.windows, owner, date);
        placement::validate_placement(proposed, window, owner, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimelineError;
    use crate::model::{ItemSpan, Status};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn range(start: u32, end: u32) -> DayRange {
        DayRange::new(d(start), d(end)).unwrap()
    }

    fn task(id: &str, start: u32, end: u32) -> ScheduleItem {
        ScheduleItem {
            id: id.into(),
            owner_id: "emp-1".into(),
            span: ItemSpan::Days(range(start, end)),
            label: id.into(),
            status: Status::Pending,
        }
    }

    fn session() -> TimelineSession {
        TimelineSession::new(LayoutConfig::default(), range(1, 14))
    }

    #[test]
    fn stale_refresh_is_discarded() {
        let mut session = session();
        let old = session.begin_refresh();
        assert!(session.on_viewport_change(range(8, 21)));
        let fresh = session.begin_refresh();

        assert!(session.complete_refresh(fresh, vec![task("new", 9, 10)], Vec::new()));
        assert!(!session.complete_refresh(old, vec![task("old", 2, 3)], Vec::new()));
        assert_eq!(session.items()[0].id, "new");
    }

    #[test]
    fn refresh_for_the_previous_day_is_discarded() {
        let mut session = session();
        session.set_mode(ViewMode::Hours(d(4)));
        let old = session.begin_refresh();
        session.set_mode(ViewMode::Hours(d(5)));
        assert!(!session.complete_refresh(old, vec![task("old", 4, 4)], Vec::new()));
        assert!(session.items().is_empty());

        let generation = session.generation();
        session.set_mode(ViewMode::Hours(d(5)));
        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn viewport_change_is_idempotent() {
        let mut session = session();
        let generation = session.generation();
        assert!(!session.on_viewport_change(range(1, 14)));
        assert_eq!(session.generation(), generation);
        assert!(session.on_viewport_change(range(2, 15)));
        assert_eq!(session.generation(), generation + 1);
    }

    #[test]
    fn layout_is_cached_until_records_change() {
        let mut session = session();
        session.set_items(vec![task("a", 2, 4), task("b", 3, 5)]);
        let lanes: Vec<_> = session.render().unwrap().iter().map(|p| p.lane).collect();
        assert_eq!(lanes, vec![0, 1]);

        session.set_items(vec![task("a", 2, 4)]);
        assert_eq!(session.render().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_ids_surface_from_render() {
        let mut session = session();
        session.set_items(vec![task("a", 2, 4), task("a", 6, 7)]);
        assert!(matches!(
            session.render(),
            Err(TimelineError::DuplicateItem(_))
        ));
    }

    #[test]
    fn switching_views_relays_out() {
        let mut session = session();
        session.set_records(
            vec![ScheduleItem {
                id: "slot".into(),
                owner_id: "emp-1".into(),
                span: ItemSpan::Hours {
                    date: d(4),
                    range: TimeRange::parse("09:00", "10:00").unwrap(),
                },
                label: "slot".into(),
                status: Status::Pending,
            }],
            Vec::new(),
        );
        session.set_mode(ViewMode::Hours(d(4)));
        let hour_width = session.config().hour_width_px;
        let item = &session.render().unwrap()[0];
        assert!(item.outside_work_window);
        assert_eq!(item.left_px, 9.0 * hour_width);
    }

    #[test]
    fn scrolling_near_the_edge_extends_and_bumps_generation() {
        let mut session = session();
        let ticket = session.begin_refresh();
        let config = session.config().clone();
        let content = 14.0 * config.day_width_px;
        let extension = session.on_scroll(content - 300.0, 300.0);
        assert_eq!(extension, Some(Extension::Forward(config.extend_days)));
        assert!(!session.complete_refresh(ticket, Vec::new(), Vec::new()));
    }

    #[test]
    fn placement_uses_loaded_windows() {
        let mut session = session();
        session.set_windows(vec![WorkWindow {
            owner_id: "emp-1".into(),
            date: d(4),
            range: TimeRange::parse("08:00", "16:00").unwrap(),
        }]);
        let owner = SharedStr::from("emp-1");
        let inside = TimeRange::parse("09:00", "10:00").unwrap();
        let late = TimeRange::parse("15:00", "17:00").unwrap();
        assert!(session.validate_placement(&owner, d(4), &inside).is_ok());
        assert!(session.validate_placement(&owner, d(4), &late).unwrap_err().is_placement());
        assert!(matches!(
            session.validate_placement(&owner, d(5), &inside),
            Err(TimelineError::NoWorkWindow { .. })
        ));
    }
}
