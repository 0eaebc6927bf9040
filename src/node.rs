//! Serialized view of a widget subtree, as sent to the host during `REFRESH`.

use serde::{Deserialize, Serialize};

use crate::elements::NodeProps;
use crate::id::{NodeHash, NodeKey};
use crate::layout::{Axis, Tracks};
use crate::text::AutoSize;

/// Which optional callbacks a node registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Caps {
    pub draw: bool,
    pub input: bool,
    /// Both `get_editbox` and `set_editbox` are present.
    pub edit: bool,
    pub shortcut: bool,
    pub drop_file: bool,
    pub drop_move: bool,
}

impl Caps {
    /// The node reacts to pointer presses.
    pub fn wants_press(&self) -> bool {
        self.input || self.edit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub hash: NodeHash,
    pub parent_hash: NodeHash,
    pub key: NodeKey,
    pub cols: Tracks,
    pub rows: Tracks,
    pub props: NodeProps,
    pub caps: Caps,
    /// Answer of the node's `auto_resize` callback.
    pub auto_size: Option<AutoSize>,
    /// Answer of the node's `get_editbox` callback.
    pub edit_value: Option<String>,
    pub children: Vec<LayoutNode>,
    /// Hashes of dialogs owned by this node; bodies are fetched separately.
    pub dialogs: Vec<NodeHash>,
}

impl LayoutNode {
    pub fn new(hash: NodeHash, parent_hash: NodeHash, key: NodeKey) -> Self {
        Self {
            hash,
            parent_hash,
            key,
            cols: Tracks::new(),
            rows: Tracks::new(),
            props: NodeProps::default(),
            caps: Caps::default(),
            auto_size: None,
            edit_value: None,
            children: Vec::new(),
            dialogs: Vec::new(),
        }
    }

    pub fn tracks(&self, axis: Axis) -> &Tracks {
        match axis {
            Axis::X => &self.cols,
            Axis::Y => &self.rows,
        }
    }

    /// No tracks and no children: the node takes the rectangle it is given.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.cols.is_empty() && self.rows.is_empty()
    }

    pub fn find(&self, hash: NodeHash) -> Option<&LayoutNode> {
        if self.hash == hash {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(hash))
    }

    /// Number of nodes in the subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(LayoutNode::count).sum::<usize>()
    }

    /// Pre-order walk.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a LayoutNode)) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }
}
