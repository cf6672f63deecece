//! SVG renderer: turns a `RenderCommand` list into a standalone document,
//! used for printable schedules.

use std::fmt::Write as _;

use crewline_protocol::{RenderCommand, TextAlign, ThemeToken};

/// Render `commands` as an SVG document of `width` x `height`.
///
/// Transforms become nested `<g>` elements and clips become `clipPath`s, so
/// the scrolled panes come out exactly as on screen.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,sans-serif">"#,
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background, dark)
    );

    let mut clip_count = 0usize;
    // Open `<g>` elements per kind, so an unbalanced list still closes.
    let mut open_transforms = 0usize;
    let mut open_clips = 0usize;

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                item_id,
            } => {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    resolve_color(*color, dark),
                );
                if let Some(border) = border_color {
                    let _ = write!(svg, r#" stroke="{}" stroke-width="1""#, resolve_color(*border, dark));
                }
                if let Some(id) = item_id {
                    let _ = write!(svg, r#" data-item="{}" rx="2""#, escape_xml(id));
                }
                svg.push('>');
                if let Some(label) = label {
                    let _ = write!(svg, "<title>{}</title>", escape_xml(label));
                }
                svg.push_str("</rect>");
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    resolve_color(*color, dark),
                );
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color, dark),
                    escape_xml(text),
                );
            }
            RenderCommand::SetClip { rect } => {
                clip_count += 1;
                let _ = write!(
                    svg,
                    r#"<clipPath id="clip{clip_count}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip{clip_count})">"#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                open_clips += 1;
            }
            RenderCommand::ClearClip => {
                if open_clips > 0 {
                    svg.push_str("</g>");
                    open_clips -= 1;
                }
            }
            RenderCommand::PushTransform { translate } => {
                let _ = write!(svg, r#"<g transform="translate({} {})">"#, translate.x, translate.y);
                open_transforms += 1;
            }
            RenderCommand::PopTransform => {
                if open_transforms > 0 {
                    svg.push_str("</g>");
                    open_transforms -= 1;
                }
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }

    for _ in 0..open_transforms + open_clips {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#181818",
            ThemeToken::Surface | ThemeToken::LabelColumnBackground => "#202024",
            ThemeToken::HeaderBackground => "#26262b",
            ThemeToken::Border => "#3a3a40",
            ThemeToken::GridLine => "#2e2e33",
            ThemeToken::HeaderText | ThemeToken::TextPrimary => "#ececec",
            ThemeToken::TextMuted => "#9e9e9e",
            ThemeToken::WeekendColumn => "#1f1f26",
            ThemeToken::TodayColumn => "#1e2a3a",
            ThemeToken::WorkWindow => "#1d3324",
            ThemeToken::NowLine => "#ff5252",
            ThemeToken::StatusPending => "#607d8b",
            ThemeToken::StatusInProgress => "#448aff",
            ThemeToken::StatusCompleted => "#43a047",
            ThemeToken::StatusOverdue => "#e53935",
            ThemeToken::StatusOnHold => "#fb8c00",
            ThemeToken::StatusCancelled => "#616161",
            ThemeToken::StatusNoShow => "#8e24aa",
            ThemeToken::OutsideWindowBorder => "#ff1744",
        }
    } else {
        match token {
            ThemeToken::Background => "#ffffff",
            ThemeToken::Surface | ThemeToken::LabelColumnBackground => "#f8f9fa",
            ThemeToken::HeaderBackground => "#f1f3f5",
            ThemeToken::Border => "#dee2e6",
            ThemeToken::GridLine => "#e9ecef",
            ThemeToken::HeaderText | ThemeToken::TextPrimary => "#1a1a2e",
            ThemeToken::TextMuted => "#666677",
            ThemeToken::WeekendColumn => "#f4f4f8",
            ThemeToken::TodayColumn => "#e7f1ff",
            ThemeToken::WorkWindow => "#e6f4ea",
            ThemeToken::NowLine => "#e63946",
            ThemeToken::StatusPending => "#b0bec5",
            ThemeToken::StatusInProgress => "#64b5f6",
            ThemeToken::StatusCompleted => "#81c784",
            ThemeToken::StatusOverdue => "#e57373",
            ThemeToken::StatusOnHold => "#ffb74d",
            ThemeToken::StatusCancelled => "#bdbdbd",
            ThemeToken::StatusNoShow => "#ba68c8",
            ThemeToken::OutsideWindowBorder => "#d50000",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewline_protocol::{Point, Rect};

    fn bar(label: &str) -> RenderCommand {
        RenderCommand::DrawRect {
            rect: Rect::new(10.0, 20.0, 100.0, 18.0),
            color: ThemeToken::StatusOverdue,
            border_color: Some(ThemeToken::OutsideWindowBorder),
            label: Some(label.into()),
            item_id: Some("t-1".into()),
        }
    }

    #[test]
    fn basic_svg_output() {
        let svg = render_svg(&[bar("Restock (overdue)")], 800.0, 400.0, true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Restock (overdue)"));
        assert!(svg.contains("#e53935"));
        assert!(svg.contains(r#"data-item="t-1""#));
    }

    #[test]
    fn escapes_xml_entities() {
        let svg = render_svg(&[bar("Fix <door> & lock")], 400.0, 100.0, false);
        assert!(svg.contains("Fix &lt;door&gt; &amp; lock"));
    }

    #[test]
    fn scrolled_panes_become_groups() {
        let commands = vec![
            RenderCommand::SetClip {
                rect: Rect::new(100.0, 30.0, 300.0, 200.0),
            },
            RenderCommand::PushTransform {
                translate: Point::new(60.0, 30.0),
            },
            bar("a"),
            RenderCommand::PopTransform,
            RenderCommand::ClearClip,
        ];
        let svg = render_svg(&commands, 400.0, 230.0, false);
        assert!(svg.contains(r#"clip-path="url(#clip1)""#));
        assert!(svg.contains(r#"transform="translate(60 30)""#));
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }

    #[test]
    fn unbalanced_groups_are_closed() {
        let commands = vec![RenderCommand::PushTransform {
            translate: Point::new(1.0, 2.0),
        }];
        let svg = render_svg(&commands, 10.0, 10.0, false);
        assert!(svg.ends_with("</g></svg>"));
    }
}
