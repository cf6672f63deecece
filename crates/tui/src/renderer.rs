use crewline_protocol::{RenderCommand, TextAlign, ThemeToken};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
};

fn theme_to_color(token: &ThemeToken) -> Color {
    match token {
        ThemeToken::Background | ThemeToken::Surface => Color::Black,
        ThemeToken::Border | ThemeToken::GridLine => Color::DarkGray,
        ThemeToken::HeaderBackground | ThemeToken::LabelColumnBackground => Color::Rgb(30, 30, 36),
        ThemeToken::HeaderText | ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextMuted => Color::Gray,
        ThemeToken::WeekendColumn => Color::Rgb(24, 24, 32),
        ThemeToken::TodayColumn => Color::Rgb(20, 36, 60),
        ThemeToken::WorkWindow => Color::Rgb(20, 48, 30),
        ThemeToken::NowLine => Color::LightRed,
        ThemeToken::StatusPending => Color::Rgb(96, 125, 139),
        ThemeToken::StatusInProgress => Color::Rgb(40, 110, 220),
        ThemeToken::StatusCompleted => Color::Rgb(46, 140, 60),
        ThemeToken::StatusOverdue => Color::Rgb(200, 50, 50),
        ThemeToken::StatusOnHold => Color::Rgb(220, 130, 20),
        ThemeToken::StatusCancelled => Color::Rgb(90, 90, 90),
        ThemeToken::StatusNoShow => Color::Rgb(140, 50, 170),
        ThemeToken::OutsideWindowBorder => Color::Red,
    }
}

/// Pixels covered by one terminal cell.
#[derive(Debug, Clone, Copy)]
pub struct CellScale {
    pub px_per_col: f64,
    pub px_per_row: f64,
}

/// Groups whose contents move with the vertical body scroll.
fn scrolls_vertically(group_id: &str) -> bool {
    group_id.ends_with("-body") || group_id == "owners"
}

#[derive(Debug, Clone, Copy)]
struct PxRect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl PxRect {
    fn intersect(self, other: PxRect) -> PxRect {
        PxRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

/// Paints a render-command list into a ratatui buffer, one cell per
/// `CellScale` block of pixels.
pub struct CellPainter<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    scale: CellScale,
    /// Body rows scroll under this many pixels of fixed header.
    header_px: f64,
    scroll_y_px: f64,
    origin: (f64, f64),
    transforms: Vec<(f64, f64)>,
    clip: Option<PxRect>,
    groups: Vec<bool>,
}

impl<'a> CellPainter<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect, scale: CellScale, header_px: f64) -> Self {
        Self {
            buf,
            area,
            scale,
            header_px,
            scroll_y_px: 0.0,
            origin: (0.0, 0.0),
            transforms: Vec::new(),
            clip: None,
            groups: Vec::new(),
        }
    }

    pub fn with_vertical_scroll(mut self, scroll_y_px: f64) -> Self {
        self.scroll_y_px = scroll_y_px;
        self
    }

    fn scrolled(&self) -> bool {
        self.groups.iter().any(|s| *s)
    }

    /// Translate a content rect to pane pixels and cut it to the current
    /// clip and to the area below the header when scrolled.
    fn place(&self, x: f64, y: f64, w: f64, h: f64) -> PxRect {
        let dy = if self.scrolled() { self.scroll_y_px } else { 0.0 };
        let x0 = self.origin.0 + x;
        let y0 = self.origin.1 + y - dy;
        let mut rect = PxRect {
            x0,
            y0,
            x1: x0 + w,
            y1: y0 + h,
        };
        if let Some(clip) = self.clip {
            rect = rect.intersect(clip);
        }
        if self.scrolled() {
            rect.y0 = rect.y0.max(self.header_px);
        }
        rect
    }

    fn cells(&self, rect: PxRect) -> impl Iterator<Item = (u16, u16)> + use<> {
        let CellScale {
            px_per_col,
            px_per_row,
        } = self.scale;
        let col0 = (rect.x0 / px_per_col).floor().max(0.0) as u16;
        let col1 = ((rect.x1 / px_per_col).ceil().max(0.0) as u16).min(self.area.width);
        let row0 = (rect.y0 / px_per_row).floor().max(0.0) as u16;
        let row1 = ((rect.y1 / px_per_row).ceil().max(0.0) as u16).min(self.area.height);
        let (ax, ay) = (self.area.x, self.area.y);
        (row0..row1).flat_map(move |row| (col0..col1).map(move |col| (ax + col, ay + row)))
    }

    fn fill(&mut self, rect: PxRect, color: Color) {
        if rect.x1 <= rect.x0 || rect.y1 <= rect.y0 {
            return;
        }
        for (x, y) in self.cells(rect).collect::<Vec<_>>() {
            self.buf[(x, y)].set_char(' ').set_bg(color);
        }
    }

    fn text(&mut self, x: f64, y: f64, text: &str, color: Color, align: TextAlign) {
        let len = text.chars().count() as f64 * self.scale.px_per_col;
        let start = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - len / 2.0,
            TextAlign::Right => x - len,
        };
        // Text is positioned by its baseline; the cell is the one above it.
        let top = y - self.scale.px_per_row / 2.0;
        let bounds = self.place(start, top, len, self.scale.px_per_row / 2.0);
        if bounds.y1 <= bounds.y0 {
            return;
        }
        let dy = if self.scrolled() { self.scroll_y_px } else { 0.0 };
        let row = ((self.origin.1 + top - dy) / self.scale.px_per_row).floor();
        if row < 0.0 || row >= f64::from(self.area.height) {
            return;
        }
        let first_col = ((self.origin.0 + start) / self.scale.px_per_col).floor();
        for (i, ch) in text.chars().enumerate() {
            let col = first_col + i as f64;
            let cell_x = col * self.scale.px_per_col;
            if col < 0.0 || col >= f64::from(self.area.width) {
                continue;
            }
            if cell_x < bounds.x0 - 0.5 || cell_x + self.scale.px_per_col > bounds.x1 + 0.5 {
                continue;
            }
            let pos = (self.area.x + col as u16, self.area.y + row as u16);
            self.buf[pos].set_char(ch).set_fg(color);
        }
    }

    fn vertical_line(&mut self, x: f64, y0: f64, y1: f64, color: Color) {
        let rect = self.place(x, y0.min(y1), 0.0, (y1 - y0).abs());
        if rect.y1 <= rect.y0 || rect.x0 > rect.x1 {
            return;
        }
        let col = (rect.x0 / self.scale.px_per_col).floor();
        if col < 0.0 || col >= f64::from(self.area.width) {
            return;
        }
        let row0 = (rect.y0 / self.scale.px_per_row).floor().max(0.0) as u16;
        let row1 = ((rect.y1 / self.scale.px_per_row).ceil() as u16).min(self.area.height);
        for row in row0..row1 {
            let pos = (self.area.x + col as u16, self.area.y + row);
            self.buf[pos].set_char('│').set_fg(color);
        }
    }

    pub fn paint(mut self, commands: &[RenderCommand]) {
        for cmd in commands {
            match cmd {
                RenderCommand::DrawRect {
                    rect,
                    color,
                    item_id,
                    border_color,
                    ..
                } => {
                    let placed = self.place(rect.x, rect.y, rect.w, rect.h);
                    self.fill(placed, theme_to_color(color));
                    // Bars outside the work window get a marker in their first cell.
                    if item_id.is_some() && *border_color == Some(ThemeToken::OutsideWindowBorder) {
                        let marker = PxRect {
                            x1: placed.x0 + self.scale.px_per_col,
                            ..placed
                        };
                        for (x, y) in self.cells(marker).take(1).collect::<Vec<_>>() {
                            self.buf[(x, y)]
                                .set_char('!')
                                .set_fg(theme_to_color(&ThemeToken::OutsideWindowBorder));
                        }
                    }
                }
                RenderCommand::DrawText {
                    position,
                    text,
                    color,
                    align,
                    ..
                } => self.text(position.x, position.y, text, theme_to_color(color), *align),
                RenderCommand::DrawLine {
                    from, to, color, ..
                } => {
                    // Grid lines would cover every cell boundary at this resolution.
                    if *color != ThemeToken::GridLine && from.x == to.x {
                        self.vertical_line(from.x, from.y, to.y, theme_to_color(color));
                    }
                }
                RenderCommand::SetClip { rect } => {
                    self.clip = Some(PxRect {
                        x0: self.origin.0 + rect.x,
                        y0: self.origin.1 + rect.y,
                        x1: self.origin.0 + rect.x + rect.w,
                        y1: self.origin.1 + rect.y + rect.h,
                    });
                }
                RenderCommand::ClearClip => self.clip = None,
                RenderCommand::PushTransform { translate } => {
                    self.transforms.push(self.origin);
                    self.origin = (self.origin.0 + translate.x, self.origin.1 + translate.y);
                }
                RenderCommand::PopTransform => {
                    self.origin = self.transforms.pop().unwrap_or((0.0, 0.0));
                }
                RenderCommand::BeginGroup { id, .. } => self.groups.push(scrolls_vertically(id)),
                RenderCommand::EndGroup => {
                    self.groups.pop();
                }
            }
        }
    }
}
