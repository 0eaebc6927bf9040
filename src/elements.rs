use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::input::DropDirs;

/// Marks a node as draggable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragSource {
    /// Only targets with the same group accept the drop.
    pub group: String,
    /// Name of the list the item belongs to.
    pub source: String,
    pub index: usize,
}

/// Marks a node as a drop destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub group: String,
    pub source: String,
    pub index: usize,
    pub dirs: DropDirs,
}

/// Presentation and interaction fields the host needs without calling back
/// into the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProps {
    pub background: Option<Color>,
    pub border: Option<Color>,
    /// Inner margin in cells.
    pub margin: f32,
    pub rounded: bool,
    pub drag: Option<DragSource>,
    pub drop: Option<DropTarget>,
    pub enable: bool,
    pub touch_enable: bool,
    pub tooltip: String,
    pub shortcut: Option<char>,
    /// Scrolling allowed on the vertical axis.
    pub scroll_v: bool,
    pub scroll_h: bool,
}

impl Default for NodeProps {
    fn default() -> Self {
        Self {
            background: None,
            border: None,
            margin: 0.0,
            rounded: false,
            drag: None,
            drop: None,
            enable: true,
            touch_enable: true,
            tooltip: String::new(),
            shortcut: None,
            scroll_v: true,
            scroll_h: true,
        }
    }
}

impl NodeProps {
    /// Sets the background color painted by the host below the buffer.
    #[inline]
    pub fn background(&mut self, color: impl Into<Color>) -> &mut Self {
        self.background = Some(color.into());
        self
    }

    #[inline]
    pub fn border(&mut self, color: impl Into<Color>) -> &mut Self {
        self.border = Some(color.into());
        self
    }

    #[inline]
    pub fn margin(&mut self, cells: f32) -> &mut Self {
        self.margin = cells.max(0.0);
        self
    }

    #[inline]
    pub fn rounded(&mut self, rounded: bool) -> &mut Self {
        self.rounded = rounded;
        self
    }

    /// Makes the node a drag source of `group`, item `index` of list `source`.
    #[inline]
    pub fn drag(&mut self, group: &str, source: &str, index: usize) -> &mut Self {
        self.drag = Some(DragSource {
            group: group.to_string(),
            source: source.to_string(),
            index,
        });
        self
    }

    /// Makes the node accept drops of `group`.
    #[inline]
    pub fn drop(&mut self, group: &str, source: &str, index: usize, dirs: DropDirs) -> &mut Self {
        self.drop = Some(DropTarget {
            group: group.to_string(),
            source: source.to_string(),
            index,
            dirs,
        });
        self
    }

    /// Disabled nodes and their subtrees receive no input.
    #[inline]
    pub fn enable(&mut self, enable: bool) -> &mut Self {
        self.enable = enable;
        self
    }

    #[inline]
    pub fn touch_enable(&mut self, enable: bool) -> &mut Self {
        self.touch_enable = enable;
        self
    }

    #[inline]
    pub fn tooltip(&mut self, text: impl Into<String>) -> &mut Self {
        self.tooltip = text.into();
        self
    }

    #[inline]
    pub fn shortcut(&mut self, key: char) -> &mut Self {
        self.shortcut = Some(key.to_ascii_lowercase());
        self
    }

    /// Forbids scrolling; overflowing content is cropped instead.
    #[inline]
    pub fn no_scroll(&mut self, vertical: bool, horizontal: bool) -> &mut Self {
        self.scroll_v = !vertical;
        self.scroll_h = !horizontal;
        self
    }

    pub fn can_touch(&self) -> bool {
        self.enable && self.touch_enable
    }
}
