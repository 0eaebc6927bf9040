//! Per-axis scroll state of a node.

use serde::{Deserialize, Serialize};

/// Wheel sentinel meaning "pin to the end". Resolve replaces it with the real
/// maximum once the data extent is known.
pub const PIN_END: i32 = i32::MAX;

/// Smallest thumb length in pixels.
const MIN_THUMB: i32 = 8;

/// Scroll-bar thickness for a given cell size.
pub fn scroll_thickness(cell: i32) -> i32 {
    ((cell as f32 / 3.0).round() as i32).max(2)
}

/// `(wheel, data, screen)` in pixels for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutScroll {
    /// Current offset of the content.
    pub wheel: i32,
    /// Content extent.
    pub data: i32,
    /// Visible extent.
    pub screen: i32,
}

impl LayoutScroll {
    pub fn new(wheel: i32, data: i32, screen: i32) -> Self {
        let mut s = Self { wheel, data, screen };
        s.clamp();
        s
    }

    /// The content overflows and a bar is shown.
    pub fn is_active(&self) -> bool {
        self.data > self.screen
    }

    pub fn max_wheel(&self) -> i32 {
        (self.data - self.screen).max(0)
    }

    pub fn clamp(&mut self) {
        self.wheel = self.wheel.clamp(0, self.max_wheel());
    }

    /// Scrolls by `delta` pixels. Returns true when the wheel moved.
    pub fn scroll_by(&mut self, delta: i32) -> bool {
        let before = self.wheel;
        self.wheel = self.wheel.saturating_add(delta);
        self.clamp();
        self.wheel != before
    }

    /// Thumb `(offset, length)` inside a bar of `track` pixels.
    pub fn thumb(&self, track: i32) -> (i32, i32) {
        if !self.is_active() || track <= 0 {
            return (0, track.max(0));
        }
        let len = ((self.screen as i64 * track as i64) / self.data as i64) as i32;
        let len = len.clamp(MIN_THUMB.min(track), track);
        let free = track - len;
        let offset = if self.max_wheel() == 0 {
            0
        } else {
            ((self.wheel as i64 * free as i64) / self.max_wheel() as i64) as i32
        };
        (offset, len)
    }

    /// Wheel position for a thumb dragged to `thumb_offset` inside `track`.
    pub fn wheel_for_thumb(&self, thumb_offset: i32, track: i32) -> i32 {
        let (_, len) = self.thumb(track);
        let free = track - len;
        if free <= 0 {
            return 0;
        }
        let offset = thumb_offset.clamp(0, free);
        ((offset as i64 * self.max_wheel() as i64) / free as i64) as i32
    }
}
