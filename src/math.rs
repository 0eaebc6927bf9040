use serde::{Deserialize, Serialize};

/// An integer pixel position or extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vec2i) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vec2i) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl From<(i32, i32)> for Vec2i {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// A rectangle in window pixels.
///
/// `start` is the top-left corner, `size` the extent. A rectangle with a
/// non-positive width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectPx {
    pub start: Vec2i,
    pub size: Vec2i,
}

impl RectPx {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            start: Vec2i::new(x, y),
            size: Vec2i::new(w, h),
        }
    }

    #[inline]
    pub fn end(&self) -> Vec2i {
        self.start.add(self.size)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    pub fn center(&self) -> Vec2i {
        Vec2i::new(self.start.x + self.size.x / 2, self.start.y + self.size.y / 2)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Vec2i) -> bool {
        p.x >= self.start.x && p.y >= self.start.y && p.x < self.end().x && p.y < self.end().y
    }

    /// True when `other` lies completely inside `self`. Empty rectangles are
    /// contained by everything.
    pub fn contains_rect(&self, other: &RectPx) -> bool {
        if other.is_empty() {
            return true;
        }
        other.start.x >= self.start.x
            && other.start.y >= self.start.y
            && other.end().x <= self.end().x
            && other.end().y <= self.end().y
    }

    /// Intersection; disjoint rectangles yield a zero-sized rect at the
    /// clamped start.
    pub fn intersect(&self, other: &RectPx) -> RectPx {
        let sx = self.start.x.max(other.start.x);
        let sy = self.start.y.max(other.start.y);
        let ex = self.end().x.min(other.end().x);
        let ey = self.end().y.min(other.end().y);
        RectPx::new(sx, sy, (ex - sx).max(0), (ey - sy).max(0))
    }

    pub fn offset(&self, by: Vec2i) -> RectPx {
        RectPx {
            start: self.start.add(by),
            size: self.size,
        }
    }

    /// Shrinks the rectangle by `px` on every side.
    pub fn inset(&self, px: i32) -> RectPx {
        RectPx::new(
            self.start.x + px,
            self.start.y + px,
            (self.size.x - 2 * px).max(0),
            (self.size.y - 2 * px).max(0),
        )
    }

    /// Converts the rectangle into cell units relative to `origin`.
    pub fn to_cells(&self, origin: Vec2i, cell: i32) -> CellRect {
        let c = cell.max(1) as f32;
        CellRect::new(
            (self.start.x - origin.x) as f32 / c,
            (self.start.y - origin.y) as f32 / c,
            self.size.x as f32 / c,
            self.size.y as f32 / c,
        )
    }
}

/// A rectangle in cell units, usually relative to a node's canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl CellRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// A rect of the given size placed at the origin.
    pub const fn sized(w: f32, h: f32) -> Self {
        Self::new(0.0, 0.0, w, h)
    }

    /// Shrinks the rect by `margin` cells on every side.
    pub fn cut(&self, margin: f32) -> CellRect {
        CellRect::new(
            self.x + margin,
            self.y + margin,
            (self.w - 2.0 * margin).max(0.0),
            (self.h - 2.0 * margin).max(0.0),
        )
    }

    /// Scales the rect into pixels and places it relative to `origin`.
    pub fn to_px(&self, origin: Vec2i, cell: i32) -> RectPx {
        let c = cell as f32;
        let x = origin.x + (self.x * c).round() as i32;
        let y = origin.y + (self.y * c).round() as i32;
        let ex = origin.x + ((self.x + self.w) * c).round() as i32;
        let ey = origin.y + ((self.y + self.h) * c).round() as i32;
        RectPx::new(x, y, ex - x, ey - y)
    }
}
