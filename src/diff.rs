//! A rendered frame and what changed between two of them.

use std::collections::BTreeSet;

use crate::id::NodeHash;
use crate::protocol::Buffers;
use crate::render_commands::DrawPrim;
use crate::resolve::ResolvedTree;

/// Resolved geometry plus the draw buffers of every visible node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub tree: ResolvedTree,
    pub buffers: Buffers,
}

impl Frame {
    pub fn new(tree: ResolvedTree, buffers: Buffers) -> Self {
        Self { tree, buffers }
    }

    pub fn buffer(&self, hash: NodeHash) -> &[DrawPrim] {
        self.buffers.get(&hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the buffers of a partial redraw and returns the hashes that
    /// took. Hashes that no longer exist in the tree are ignored.
    pub fn apply_redraw(&mut self, buffers: Buffers) -> BTreeSet<NodeHash> {
        let mut applied = BTreeSet::new();
        for (hash, prims) in buffers {
            if self.tree.find(hash).is_some() {
                self.buffers.insert(hash, prims);
                applied.insert(hash);
            }
        }
        applied
    }

    pub fn hashes(&self) -> BTreeSet<NodeHash> {
        self.tree
            .levels
            .iter()
            .flat_map(|l| l.nodes.iter().map(|n| n.hash))
            .collect()
    }

    /// Compares `self` (new) against `old`.
    pub fn diff(&self, old: &Frame) -> FrameDiff {
        let now = self.hashes();
        let before = old.hashes();
        let mut diff = FrameDiff {
            removed: before.difference(&now).copied().collect(),
            ..Default::default()
        };
        for &hash in &now {
            let rect = self.tree.find(hash).map(|(_, n)| n.wire_rect());
            let old_rect = old.tree.find(hash).map(|(_, n)| n.wire_rect());
            if rect != old_rect {
                diff.relayout.insert(hash);
            }
            if self.buffers.get(&hash) != old.buffers.get(&hash) {
                diff.repaint.insert(hash);
            }
        }
        // Nodes are stored parents first, so one pass carries a relayout
        // down every subtree.
        for level in &self.tree.levels {
            for node in &level.nodes {
                let parent_moved = node
                    .parent
                    .is_some_and(|p| diff.relayout.contains(&level.nodes[p].hash));
                if parent_moved {
                    diff.relayout.insert(node.hash);
                }
            }
        }
        diff
    }
}

/// Hashes whose geometry changed, whose buffers changed, and that vanished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDiff {
    pub relayout: BTreeSet<NodeHash>,
    pub repaint: BTreeSet<NodeHash>,
    pub removed: BTreeSet<NodeHash>,
}

impl FrameDiff {
    pub fn is_empty(&self) -> bool {
        self.relayout.is_empty() && self.repaint.is_empty() && self.removed.is_empty()
    }

    /// Whether anything cached for `hash` is stale.
    pub fn touches(&self, hash: NodeHash) -> bool {
        self.relayout.contains(&hash) || self.repaint.contains(&hash) || self.removed.contains(&hash)
    }

    /// Folds a later diff into this one. A node that came back after being
    /// removed is no longer reported as removed.
    pub fn merge(&mut self, later: FrameDiff) {
        self.removed.retain(|h| !later.relayout.contains(h) && !later.repaint.contains(h));
        self.relayout.extend(later.relayout);
        self.repaint.extend(later.repaint);
        self.removed.extend(later.removed);
    }
}
