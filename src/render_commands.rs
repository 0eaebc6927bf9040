//! Draw-command buffers.
//!
//! A widget never renders pixels. Its `draw` callback fills a [`Paint`] with
//! primitives whose rectangles are in cell units relative to the node's
//! canvas; the host scales them by the current cell size, translates them to
//! the canvas and clips them to the node's crop.

use serde::{Deserialize, Serialize};

use crate::align::Align;
use crate::color::{Color, Tint};
use crate::math::CellRect;

/// Mouse cursor shapes a primitive can request while hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorIcon {
    #[default]
    Default,
    Pointer,
    Text,
    Move,
    ResizeH,
    ResizeV,
    Wait,
    NotAllowed,
}

/// Behaviour flags of a text primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextFlags {
    pub multiline: bool,
    pub linewrap: bool,
    pub password: bool,
    /// The host may select and copy the text.
    pub selection: bool,
    /// The text is the value of an editbox; the host swaps in its edit buffer
    /// while the node has focus.
    pub editable: bool,
}

/// A run of text inside a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrim {
    pub rect: CellRect,
    pub text: String,
    /// Placeholder shown while `text` is empty.
    pub ghost: String,
    pub tint: Tint,
    pub flags: TextFlags,
    pub align: Align,
    /// Inner margin in cells: left, top, right, bottom.
    pub margin: [f32; 4],
}

impl TextPrim {
    pub fn new(rect: CellRect, text: impl Into<String>, tint: impl Into<Tint>) -> Self {
        Self {
            rect,
            text: text.into(),
            ghost: String::new(),
            tint: tint.into(),
            flags: TextFlags::default(),
            align: Align::default(),
            margin: [0.1, 0.0, 0.1, 0.0],
        }
    }

    /// The area the glyphs are laid out in, after the margin.
    pub fn inner(&self) -> CellRect {
        let [l, t, r, b] = self.margin;
        CellRect::new(
            self.rect.x + l,
            self.rect.y + t,
            (self.rect.w - l - r).max(0.0),
            (self.rect.h - t - b).max(0.0),
        )
    }
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawPrim {
    /// Filled when `border` is zero, otherwise an outline of `border` cells.
    Rect {
        rect: CellRect,
        tint: Tint,
        radius: f32,
        border: f32,
    },
    Circle {
        rect: CellRect,
        tint: Tint,
        border: f32,
    },
    /// `start` and `end` are fractions of `rect` (0..1 on each axis).
    Line {
        rect: CellRect,
        start: (f32, f32),
        end: (f32, f32),
        tint: Tint,
        width: f32,
    },
    File {
        rect: CellRect,
        path: String,
        tint: Tint,
        align: Align,
    },
    Text(TextPrim),
    Cursor {
        rect: CellRect,
        cursor: CursorIcon,
    },
    Tooltip {
        rect: CellRect,
        description: String,
        /// Show immediately instead of waiting for the hover threshold.
        force: bool,
    },
    /// Polyline with points as fractions of `rect`.
    Brush {
        rect: CellRect,
        color: Color,
        width: f32,
        points: Vec<(f32, f32)>,
    },
}

impl DrawPrim {
    pub fn rect(&self) -> CellRect {
        match self {
            DrawPrim::Rect { rect, .. }
            | DrawPrim::Circle { rect, .. }
            | DrawPrim::Line { rect, .. }
            | DrawPrim::File { rect, .. }
            | DrawPrim::Cursor { rect, .. }
            | DrawPrim::Tooltip { rect, .. }
            | DrawPrim::Brush { rect, .. } => *rect,
            DrawPrim::Text(text) => text.rect,
        }
    }

    /// Primitives that only influence interaction and paint nothing.
    pub fn is_invisible(&self) -> bool {
        matches!(self, DrawPrim::Cursor { .. } | DrawPrim::Tooltip { .. })
    }
}

/// Builder for one node's draw-command buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paint {
    prims: Vec<DrawPrim>,
}

impl Paint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filled rectangle.
    pub fn rect(&mut self, rect: CellRect, tint: impl Into<Tint>) -> &mut Self {
        self.prims.push(DrawPrim::Rect {
            rect,
            tint: tint.into(),
            radius: 0.0,
            border: 0.0,
        });
        self
    }

    /// Filled rectangle with rounded corners, radius in cells.
    pub fn rounded_rect(&mut self, rect: CellRect, tint: impl Into<Tint>, radius: f32) -> &mut Self {
        self.prims.push(DrawPrim::Rect {
            rect,
            tint: tint.into(),
            radius,
            border: 0.0,
        });
        self
    }

    /// Rectangle outline `width` cells thick.
    pub fn border(&mut self, rect: CellRect, tint: impl Into<Tint>, width: f32) -> &mut Self {
        self.prims.push(DrawPrim::Rect {
            rect,
            tint: tint.into(),
            radius: 0.0,
            border: width,
        });
        self
    }

    pub fn circle(&mut self, rect: CellRect, tint: impl Into<Tint>, border: f32) -> &mut Self {
        self.prims.push(DrawPrim::Circle {
            rect,
            tint: tint.into(),
            border,
        });
        self
    }

    pub fn line(
        &mut self,
        rect: CellRect,
        start: (f32, f32),
        end: (f32, f32),
        tint: impl Into<Tint>,
        width: f32,
    ) -> &mut Self {
        self.prims.push(DrawPrim::Line {
            rect,
            start,
            end,
            tint: tint.into(),
            width,
        });
        self
    }

    pub fn file(&mut self, rect: CellRect, path: impl Into<String>, tint: impl Into<Tint>, align: Align) -> &mut Self {
        self.prims.push(DrawPrim::File {
            rect,
            path: path.into(),
            tint: tint.into(),
            align,
        });
        self
    }

    /// Single-line label.
    pub fn text(&mut self, rect: CellRect, text: impl Into<String>, tint: impl Into<Tint>, align: Align) -> &mut Self {
        let mut prim = TextPrim::new(rect, text, tint);
        prim.align = align;
        self.prims.push(DrawPrim::Text(prim));
        self
    }

    /// Fully configured text primitive.
    pub fn text_prim(&mut self, prim: TextPrim) -> &mut Self {
        self.prims.push(DrawPrim::Text(prim));
        self
    }

    pub fn cursor(&mut self, rect: CellRect, cursor: CursorIcon) -> &mut Self {
        self.prims.push(DrawPrim::Cursor { rect, cursor });
        self
    }

    pub fn tooltip(&mut self, rect: CellRect, description: impl Into<String>, force: bool) -> &mut Self {
        self.prims.push(DrawPrim::Tooltip {
            rect,
            description: description.into(),
            force,
        });
        self
    }

    pub fn brush(&mut self, rect: CellRect, color: Color, width: f32, points: Vec<(f32, f32)>) -> &mut Self {
        self.prims.push(DrawPrim::Brush {
            rect,
            color,
            width,
            points,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prims.len()
    }

    pub fn prims(&self) -> &[DrawPrim] {
        &self.prims
    }

    pub fn into_prims(self) -> Vec<DrawPrim> {
        self.prims
    }
}
