use serde::{Deserialize, Serialize};

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum AlignX {
    #[default]
    Left,
    CenterX,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum AlignY {
    Top,
    #[default]
    CenterY,
    Bottom,
}

/// Both alignment axes, as carried by text and image primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Align {
    pub x: AlignX,
    pub y: AlignY,
}

impl Align {
    pub const CENTER: Align = Align::new(AlignX::CenterX, AlignY::CenterY);

    pub const fn new(x: AlignX, y: AlignY) -> Self {
        Self { x, y }
    }

    /// Offset of an item of `item` length inside `space`, per axis.
    pub fn place(&self, space: (f32, f32), item: (f32, f32)) -> (f32, f32) {
        let dx = match self.x {
            AlignX::Left => 0.0,
            AlignX::CenterX => (space.0 - item.0) / 2.0,
            AlignX::Right => space.0 - item.0,
        };
        let dy = match self.y {
            AlignY::Top => 0.0,
            AlignY::CenterY => (space.1 - item.1) / 2.0,
            AlignY::Bottom => space.1 - item.1,
        };
        (dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_splits_the_slack() {
        assert_eq!(Align::CENTER.place((100.0, 40.0), (60.0, 20.0)), (20.0, 10.0));
    }

    #[test]
    fn right_bottom_hugs_the_far_edge() {
        let a = Align::new(AlignX::Right, AlignY::Bottom);
        assert_eq!(a.place((100.0, 40.0), (60.0, 20.0)), (40.0, 20.0));
    }

    #[test]
    fn default_is_left_and_vertically_centered() {
        assert_eq!(Align::default().place((100.0, 40.0), (120.0, 20.0)), (0.0, 10.0));
    }
}
