use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// Timeline views emit a `Vec<RenderCommand>`; the browser canvas, the
/// terminal previewer and the SVG exporter all consume the same list in
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle. `item_id` is set for schedule bars so the
    /// front-end can map clicks back to the task.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<SharedStr>,
        item_id: Option<SharedStr>,
    },

    DrawText {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    ClearClip,

    /// Translate every following command until the matching
    /// `PopTransform`. Views use it for the horizontally scrolled part of a
    /// pane.
    PushTransform { translate: Point },

    PopTransform,

    /// Begin a logical group (header pane, body pane, one owner row).
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    EndGroup,
}

impl RenderCommand {
    /// Shorthand for a plain filled rectangle with no label or item.
    pub fn fill(rect: Rect, color: ThemeToken) -> Self {
        RenderCommand::DrawRect {
            rect,
            color,
            border_color: None,
            label: None,
            item_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
