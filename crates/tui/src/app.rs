use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use crewline_core::model::{Clock, SystemClock};
use crewline_core::scroll::{ScrollPane, ScrollSync};
use crewline_core::views::{NowIndicator, PaneSize};
use crewline_core::{TimelineSession, ViewMode};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
};

use crate::renderer::{CellPainter, CellScale};

pub const SCALE: CellScale = CellScale {
    px_per_col: 8.0,
    px_per_row: 16.0,
};

/// Header pane offset, kept in step with the body by the scroll sync.
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

pub struct App {
    session: TimelineSession,
    sync: ScrollSync,
    header: HeaderPane,
    now: NowIndicator,
    clock: SystemClock,
    body_scroll_px: f64,
    scroll_y_px: f64,
    pane: PaneSize,
    hours_date: NaiveDate,
}

impl App {
    pub fn new(session: TimelineSession, hours_date: NaiveDate) -> Self {
        Self {
            body_scroll_px: session.scroll_offset_px(),
            session,
            sync: ScrollSync::new(),
            header: HeaderPane::default(),
            now: NowIndicator::new(hours_date),
            clock: SystemClock,
            scroll_y_px: 0.0,
            pane: PaneSize::new(0.0, 0.0),
            hours_date,
        }
    }

    fn scroll_by(&mut self, delta_px: f64) {
        self.body_scroll_px = (self.body_scroll_px + delta_px).max(0.0);
        self.sync.on_driver_scroll(self.body_scroll_px);
    }

    /// Frame step: apply the coalesced scroll to the header and the session.
    fn apply_pending_scroll(&mut self) {
        let header: &mut dyn ScrollPane = &mut self.header;
        let Some(offset) = self.sync.on_frame(Some(header)) else {
            return;
        };
        let body_width = self.pane.body_width(self.session.config());
        match self.session.mode() {
            ViewMode::Days => {
                if let Some(extension) = self.session.on_scroll(offset, body_width) {
                    tracing::info!(?extension, range = %self.session.viewport().visible, "extended range");
                }
                self.body_scroll_px = self.session.scroll_offset_px();
                self.header.scroll_x = self.body_scroll_px;
            }
            ViewMode::Hours(_) => {
                let max = (24.0 * self.session.config().hour_width_px - body_width).max(0.0);
                self.body_scroll_px = offset.min(max);
                self.session.set_hour_scroll(self.body_scroll_px);
                self.now
                    .on_scroll(self.body_scroll_px, &self.clock, self.session.config());
            }
        }
    }

    fn toggle_view(&mut self) {
        let next = match self.session.mode() {
            ViewMode::Days => ViewMode::Hours(self.hours_date),
            ViewMode::Hours(_) => ViewMode::Days,
        };
        self.session.set_mode(next);
        if let ViewMode::Hours(date) = next {
            self.now.set_viewed_date(date);
        }
        self.body_scroll_px = self.session.scroll_offset_px();
        self.header.scroll_x = self.body_scroll_px;
        self.scroll_y_px = 0.0;
    }

    fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let area = frame.area();
        let body = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1));
        self.pane = PaneSize::new(
            f64::from(body.width) * SCALE.px_per_col,
            f64::from(body.height) * SCALE.px_per_row,
        );

        let today = self.clock.now().date();
        let commands = self
            .session
            .render_commands(self.pane, today, Some(&self.now))?;
        let header_px = self.session.config().header_height_px;
        CellPainter::new(frame.buffer_mut(), body, SCALE, header_px)
            .with_vertical_scroll(self.scroll_y_px)
            .paint(&commands);

        let view = match self.session.mode() {
            ViewMode::Days => format!("days {}", self.session.viewport().visible),
            ViewMode::Hours(date) => format!("hours {date}"),
        };
        let status = format!(
            " crewline | {view} | {} items | ←→ scroll ↑↓ rows PgUp/PgDn week t view n today q quit ",
            self.session.items().len()
        );
        let status_area = Rect::new(area.x, area.y + body.height, area.width, 1);
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::White).bg(Color::DarkGray)),
            status_area,
        );
        Ok(())
    }

    /// Handle one input event. Returns `false` to quit.
    fn handle(&mut self, event: &Event) -> bool {
        let day_step = self.session.config().day_width_px;
        let hour_step = self.session.config().hour_width_px / 2.0;
        let step = match self.session.mode() {
            ViewMode::Days => day_step,
            ViewMode::Hours(_) => hour_step,
        };
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return false,
                KeyCode::Left => self.scroll_by(-step),
                KeyCode::Right => self.scroll_by(step),
                KeyCode::Up => self.scroll_y_px = (self.scroll_y_px - SCALE.px_per_row).max(0.0),
                KeyCode::Down => self.scroll_y_px += SCALE.px_per_row,
                KeyCode::PageUp => self.session.shift_days(-7),
                KeyCode::PageDown => self.session.shift_days(7),
                KeyCode::Char('t') => self.toggle_view(),
                KeyCode::Char('n') => {
                    let today = self.clock.now().date();
                    self.session.jump_to(today, self.pane.body_width(self.session.config()));
                    self.body_scroll_px = self.session.scroll_offset_px();
                    self.header.scroll_x = self.body_scroll_px;
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.scroll_y_px += SCALE.px_per_row,
                MouseEventKind::ScrollUp => {
                    self.scroll_y_px = (self.scroll_y_px - SCALE.px_per_row).max(0.0);
                }
                MouseEventKind::ScrollLeft => self.scroll_by(-step),
                MouseEventKind::ScrollRight => self.scroll_by(step),
                _ => {}
            },
            _ => {}
        }
        true
    }
}

pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.apply_pending_scroll();
        let config = app.session.config().clone();
        app.now.poll(&app.clock, &config);

        let mut draw_result = Ok(());
        terminal.draw(|frame| draw_result = app.draw(frame))?;
        draw_result?;

        if event::poll(Duration::from_millis(100))? && !app.handle(&event::read()?) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewline_core::LayoutConfig;
    use crewline_core::model::DayRange;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn app() -> App {
        // Infinite extension is covered by the session tests.
        let config = LayoutConfig {
            extend_days: 0,
            ..LayoutConfig::default()
        };
        let session = TimelineSession::new(config, DayRange::new(d(1), d(28)).unwrap());
        let mut app = App::new(session, d(4));
        app.pane = PaneSize::new(800.0, 320.0);
        app
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn key_repeats_coalesce_into_one_frame() {
        let mut app = app();
        for _ in 0..3 {
            app.handle(&key(KeyCode::Right));
        }
        app.apply_pending_scroll();
        let step = app.session.config().day_width_px;
        assert_eq!(app.header.scroll_x, 3.0 * step);
        assert_eq!(app.session.scroll_offset_px(), 3.0 * step);
        assert_eq!(app.sync.frames_applied(), 1);
    }

    #[test]
    fn toggling_switches_scroll_state() {
        let mut app = app();
        app.handle(&key(KeyCode::Right));
        app.apply_pending_scroll();
        app.handle(&key(KeyCode::Char('t')));
        assert_eq!(app.session.mode(), ViewMode::Hours(d(4)));
        assert_eq!(app.body_scroll_px, 0.0);
        assert!(!app.handle(&key(KeyCode::Char('q'))));
    }

    #[test]
    fn hourly_scroll_is_clamped_to_the_day() {
        let mut app = app();
        app.handle(&key(KeyCode::Char('t')));
        for _ in 0..200 {
            app.handle(&key(KeyCode::Right));
        }
        app.apply_pending_scroll();
        let config = app.session.config();
        let max = 24.0 * config.hour_width_px - app.pane.body_width(config);
        assert_eq!(app.session.hour_scroll_px(), max);
    }
}
