//! Input records: the host's raw per-frame input and the structured
//! [`LayoutInput`] delivered to a node's callbacks.

use serde::{Deserialize, Serialize};

use crate::math::{CellRect, RectPx, Vec2i};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Everything the window system reported for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    /// Seconds since an arbitrary epoch, monotonic.
    pub time: f64,
    pub window: Vec2i,
    pub pointer: Vec2i,
    pub left_down: bool,
    pub right_down: bool,
    /// Wheel motion in pixels; positive values move toward the start of the
    /// content.
    pub wheel: (f32, f32),
    pub mods: Modifiers,
    /// Keys pressed this frame, in order. Typed text arrives as `Key::Char`.
    pub keys: Vec<Key>,
    pub dropped_files: Vec<String>,
}

impl RawInput {
    pub fn any_down(&self) -> bool {
        self.left_down || self.right_down
    }
}

/// Drop directions a target accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropDirs {
    /// Items stacked top to bottom; drop above or below.
    pub vertical: bool,
    /// Items laid out left to right; drop before or after.
    pub horizontal: bool,
    pub inside: bool,
}

impl DropDirs {
    pub const VERTICAL: DropDirs = DropDirs {
        vertical: true,
        horizontal: false,
        inside: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.vertical || self.horizontal || self.inside)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPos {
    Inside,
    VerticalBefore,
    VerticalAfter,
    HorizontalBefore,
    HorizontalAfter,
}

impl DropPos {
    /// Picks the drop position of `pointer` over `rect` among `dirs`.
    ///
    /// The centre quarter of the rect means `Inside` when allowed; otherwise
    /// the dominant offset from the centre decides the side.
    pub fn compute(rect: &RectPx, pointer: Vec2i, dirs: DropDirs) -> Option<DropPos> {
        if dirs.is_empty() || rect.is_empty() {
            return None;
        }
        let c = rect.center();
        let dx = (pointer.x - c.x) as f32 / rect.size.x as f32;
        let dy = (pointer.y - c.y) as f32 / rect.size.y as f32;

        let near_centre = dx.abs() < 0.25 && dy.abs() < 0.25;
        if dirs.inside && (near_centre || !(dirs.vertical || dirs.horizontal)) {
            return Some(DropPos::Inside);
        }
        let vertical = dirs.vertical && (!dirs.horizontal || dy.abs() >= dx.abs());
        Some(if vertical {
            if dy < 0.0 {
                DropPos::VerticalBefore
            } else {
                DropPos::VerticalAfter
            }
        } else if dx < 0.0 {
            DropPos::HorizontalBefore
        } else {
            DropPos::HorizontalAfter
        })
    }

    pub fn is_after(&self) -> bool {
        matches!(self, DropPos::VerticalAfter | DropPos::HorizontalAfter)
    }
}

/// A completed drag-and-drop, delivered to the destination's `drop_move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropMove {
    pub src_i: usize,
    pub dst_i: usize,
    pub src_source: String,
    pub dst_source: String,
    pub pos: DropPos,
}

impl DropMove {
    /// Final insertion index in the destination list once the source item
    /// has been removed.
    pub fn target_index(&self) -> usize {
        if self.pos == DropPos::Inside {
            return self.dst_i;
        }
        let mut target = self.dst_i + usize::from(self.pos.is_after());
        if self.src_source == self.dst_source && self.src_i < target {
            target -= 1;
        }
        target
    }

    /// The drop would leave the data unchanged.
    pub fn is_noop(&self) -> bool {
        if self.src_source != self.dst_source {
            return false;
        }
        match self.pos {
            DropPos::Inside => self.src_i == self.dst_i,
            _ => self.target_index() == self.src_i,
        }
    }
}

/// New editbox value pushed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEdit {
    pub value: String,
    /// `true` on Enter, `false` on blur or Esc.
    pub commit: bool,
}

/// Interaction snapshot for one node, in the node's local cell coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutInput {
    /// The node's canvas in cells, at the origin.
    pub rect: CellRect,
    pub x: f32,
    pub y: f32,
    /// The button went down on this node this frame.
    pub is_start: bool,
    /// This node holds the press.
    pub is_active: bool,
    /// The press held by this node ended this frame.
    pub is_end: bool,
    pub is_inside: bool,
    /// No button is held.
    pub is_up: bool,
    pub is_over_scroll: bool,
    pub num_clicks: u8,
    pub right_button: bool,
    pub mods: Modifiers,
    pub shortcut_key: Option<char>,
    pub set_edit: Option<SetEdit>,
    pub drop_move: Option<DropMove>,
    pub drop_file: Option<String>,
}

impl LayoutInput {
    /// Release inside the node after `num_clicks` presses with the given button.
    pub fn is_clicked(&self, num_clicks: u8, right_button: bool) -> bool {
        self.is_end && self.is_inside && self.num_clicks >= num_clicks && self.right_button == right_button
    }

    pub fn is_shortcut(&self) -> bool {
        self.shortcut_key.is_some()
    }

    /// Pointer position as a fraction of the node's size.
    pub fn relative(&self) -> (f32, f32) {
        let fx = if self.rect.w > 0.0 { self.x / self.rect.w } else { 0.0 };
        let fy = if self.rect.h > 0.0 { self.y / self.rect.h } else { 0.0 };
        (fx, fy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(src_i: usize, dst_i: usize, pos: DropPos, same: bool) -> DropMove {
        DropMove {
            src_i,
            dst_i,
            src_source: "live".into(),
            dst_source: if same { "live".into() } else { "other".into() },
            pos,
        }
    }

    #[test]
    fn drop_before_later_item_in_same_list() {
        let m = mv(2, 5, DropPos::VerticalBefore, true);
        assert_eq!(m.target_index(), 4);
        assert!(!m.is_noop());
    }

    #[test]
    fn drop_after_earlier_item() {
        assert_eq!(mv(5, 1, DropPos::VerticalAfter, true).target_index(), 2);
    }

    #[test]
    fn dropping_next_to_itself_is_a_noop() {
        assert!(mv(3, 3, DropPos::VerticalBefore, true).is_noop());
        assert!(mv(3, 4, DropPos::VerticalBefore, true).is_noop());
        assert!(!mv(3, 3, DropPos::VerticalBefore, false).is_noop());
    }

    #[test]
    fn other_list_keeps_the_index() {
        assert_eq!(mv(2, 5, DropPos::HorizontalAfter, false).target_index(), 6);
    }

    #[test]
    fn drop_pos_from_pointer() {
        let r = RectPx::new(0, 0, 100, 40);
        assert_eq!(
            DropPos::compute(&r, Vec2i::new(50, 5), DropDirs::VERTICAL),
            Some(DropPos::VerticalBefore)
        );
        assert_eq!(
            DropPos::compute(&r, Vec2i::new(50, 35), DropDirs::VERTICAL),
            Some(DropPos::VerticalAfter)
        );
        let all = DropDirs {
            vertical: true,
            horizontal: true,
            inside: true,
        };
        assert_eq!(DropPos::compute(&r, Vec2i::new(50, 20), all), Some(DropPos::Inside));
        assert_eq!(
            DropPos::compute(&r, Vec2i::new(2, 20), all),
            Some(DropPos::HorizontalBefore)
        );
        assert_eq!(DropPos::compute(&r, Vec2i::new(2, 20), DropDirs::default()), None);
    }

    #[test]
    fn clicked_requires_release_inside() {
        let mut input = LayoutInput {
            is_end: true,
            is_inside: true,
            num_clicks: 2,
            ..Default::default()
        };
        assert!(input.is_clicked(1, false));
        assert!(input.is_clicked(2, false));
        assert!(!input.is_clicked(2, true));
        input.is_inside = false;
        assert!(!input.is_clicked(1, false));
    }
}
