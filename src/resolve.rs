//! Host-side resolve phase.
//!
//! Turns the widget snapshots of one refresh into pixel rectangles. Levels
//! are resolved in stack order: the root first, then every open dialog, so a
//! relative dialog can be placed against a node of a lower level.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::elements::NodeProps;
use crate::id::{NodeHash, NodeKey, NO_HASH};
use crate::layout::{Axis, Tracks};
use crate::math::{RectPx, Vec2i};
use crate::node::{Caps, LayoutNode};
use crate::protocol::{RectsMsg, WireRect};
use crate::scroll::{scroll_thickness, LayoutScroll};
use crate::settings::{DialogEntry, Settings};
use crate::solver::{self, densify, TrackInput};
use crate::text::{Intrinsic, TextMeasure};

/// Iterations of the scroll-bar decision. Each round can only add bars, so
/// two rounds settle both axes and the third confirms.
const SCROLL_ROUNDS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub hash: NodeHash,
    pub parent: Option<usize>,
    pub depth: u16,
    pub key: NodeKey,
    pub props: NodeProps,
    pub caps: Caps,
    pub edit_value: Option<String>,
    /// Slot assigned by the parent grid.
    pub rect: RectPx,
    /// Full content extent, shifted by the scroll wheels.
    pub canvas: RectPx,
    /// Visible part of the canvas inside the slot, scroll bars excluded.
    pub view: RectPx,
    /// `view` clipped by the parent's crop.
    pub crop: RectPx,
    pub v_scroll: LayoutScroll,
    pub h_scroll: LayoutScroll,
    /// Resolved column widths in pixels.
    pub cols: Vec<i32>,
    pub rows: Vec<i32>,
    pub col_tracks: Tracks,
    pub row_tracks: Tracks,
    pub children: Vec<usize>,
    pub dialogs: Vec<NodeHash>,
}

impl ResolvedNode {
    pub fn scroll(&self, axis: Axis) -> &LayoutScroll {
        match axis {
            Axis::X => &self.h_scroll,
            Axis::Y => &self.v_scroll,
        }
    }

    pub fn resolved(&self, axis: Axis) -> &[i32] {
        match axis {
            Axis::X => &self.cols,
            Axis::Y => &self.rows,
        }
    }

    pub fn tracks(&self, axis: Axis) -> &Tracks {
        match axis {
            Axis::X => &self.col_tracks,
            Axis::Y => &self.row_tracks,
        }
    }

    pub fn wire_rect(&self) -> WireRect {
        WireRect {
            canvas: self.canvas,
            crop: self.crop,
        }
    }

    /// Vertical scroll bar along the right edge of the slot.
    pub fn v_bar(&self, thickness: i32) -> Option<RectPx> {
        if !self.v_scroll.is_active() {
            return None;
        }
        let h = self.rect.size.y - if self.h_scroll.is_active() { thickness } else { 0 };
        Some(RectPx::new(self.rect.end().x - thickness, self.rect.start.y, thickness, h))
    }

    /// Horizontal scroll bar along the bottom edge of the slot.
    pub fn h_bar(&self, thickness: i32) -> Option<RectPx> {
        if !self.h_scroll.is_active() {
            return None;
        }
        let w = self.rect.size.x - if self.v_scroll.is_active() { thickness } else { 0 };
        Some(RectPx::new(self.rect.start.x, self.rect.end().y - thickness, w, thickness))
    }

    /// Pixel position of the boundary after track `pos`.
    pub fn boundary(&self, axis: Axis, pos: usize) -> i32 {
        let start = match axis {
            Axis::X => self.canvas.start.x,
            Axis::Y => self.canvas.start.y,
        };
        start + solver::offset_of(self.resolved(axis), pos + 1)
    }
}

/// One root-like subtree: the application root or an open dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub hash: NodeHash,
    /// Window rectangle of the level.
    pub rect: RectPx,
    pub dialog: Option<DialogEntry>,
    /// Pre-order; index 0 is the level's root node.
    pub nodes: Vec<ResolvedNode>,
    index: FxHashMap<NodeHash, usize>,
}

impl Level {
    pub fn get(&self, hash: NodeHash) -> Option<&ResolvedNode> {
        self.index.get(&hash).map(|&i| &self.nodes[i])
    }

    pub fn position(&self, hash: NodeHash) -> Option<usize> {
        self.index.get(&hash).copied()
    }

    /// Deepest, top-most node whose crop contains `p`.
    pub fn hit(&self, p: Vec2i) -> Option<usize> {
        self.nodes.iter().rposition(|n| n.crop.contains(p))
    }

    /// `idx` and its ancestors, nearest first.
    pub fn ancestors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(idx), move |&i| self.nodes[i].parent)
    }

    /// Rectangles for the widget's draw pass.
    pub fn rects(&self, cell: i32) -> RectsMsg {
        RectsMsg {
            cell,
            rects: self.nodes.iter().map(|n| (n.hash, n.wire_rect())).collect(),
        }
    }

    pub fn is_dialog(&self) -> bool {
        self.dialog.is_some()
    }
}

/// Every level of one refresh, bottom first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTree {
    pub cell: i32,
    pub window: Vec2i,
    pub levels: Vec<Level>,
}

impl ResolvedTree {
    pub fn top(&self) -> Option<&Level> {
        self.levels.last()
    }

    /// Finds `hash`, searching the top level first.
    pub fn find(&self, hash: NodeHash) -> Option<(usize, &ResolvedNode)> {
        self.levels
            .iter()
            .enumerate()
            .rev()
            .find_map(|(li, level)| level.get(hash).map(|n| (li, n)))
    }

    pub fn node(&self, level: usize, idx: usize) -> Option<&ResolvedNode> {
        self.levels.get(level).and_then(|l| l.nodes.get(idx))
    }

    pub fn scroll_thickness(&self) -> i32 {
        scroll_thickness(self.cell)
    }

    pub fn node_count(&self) -> usize {
        self.levels.iter().map(|l| l.nodes.len()).sum()
    }
}

/// Resolves the levels of one refresh.
pub struct Resolver<'a> {
    settings: &'a mut Settings,
    measure: &'a dyn TextMeasure,
    out: ResolvedTree,
    intrinsic: FxHashMap<NodeHash, Option<Intrinsic>>,
}

impl<'a> Resolver<'a> {
    pub fn new(settings: &'a mut Settings, measure: &'a dyn TextMeasure, cell: i32, window: Vec2i) -> Self {
        Self {
            settings,
            measure,
            out: ResolvedTree {
                cell: cell.max(1),
                window,
                levels: Vec::new(),
            },
            intrinsic: FxHashMap::default(),
        }
    }

    fn cell(&self) -> i32 {
        self.out.cell
    }

    fn window_rect(&self) -> RectPx {
        RectPx::new(0, 0, self.out.window.x, self.out.window.y)
    }

    /// Resolves the application root over the whole window.
    pub fn resolve_root(&mut self, root: &LayoutNode) -> RectsMsg {
        let rect = self.window_rect();
        self.resolve_level(root, rect, None)
    }

    /// Resolves an open dialog, placing it against the levels below.
    pub fn resolve_dialog(&mut self, dialog: &LayoutNode, entry: &DialogEntry) -> RectsMsg {
        let rect = self.place_dialog(dialog, entry);
        self.resolve_level(dialog, rect, Some(entry.clone()))
    }

    pub fn finish(self) -> ResolvedTree {
        self.out
    }

    /// Resolved so far.
    pub fn tree(&self) -> &ResolvedTree {
        &self.out
    }

    fn resolve_level(&mut self, root: &LayoutNode, rect: RectPx, dialog: Option<DialogEntry>) -> RectsMsg {
        let mut level = Level {
            hash: root.hash,
            rect,
            dialog,
            nodes: Vec::new(),
            index: FxHashMap::default(),
        };
        self.place(root, rect, rect, None, 0, &mut level);
        let rects = level.rects(self.cell());
        trace!(hash = root.hash, nodes = level.nodes.len(), "level resolved");
        self.out.levels.push(level);
        rects
    }

    /// Preferred dialog size: the sum of its track maxima, clamped to the
    /// window.
    fn dialog_size(&mut self, dialog: &LayoutNode) -> Vec2i {
        let cell = self.cell();
        let mut size = [0i32; 2];
        for (i, axis) in [Axis::X, Axis::Y].into_iter().enumerate() {
            let inputs = self.track_inputs(dialog, axis);
            size[i] = solver::sum_px(inputs.iter().map(|t| t.bounds_px(cell).1));
        }
        let win = self.out.window;
        Vec2i::new(size[0].clamp(0, win.x.max(0)), size[1].clamp(0, win.y.max(0)))
    }

    fn place_dialog(&mut self, dialog: &LayoutNode, entry: &DialogEntry) -> RectPx {
        let size = self.dialog_size(dialog);
        let win = self.out.window;

        let anchor = if entry.parent_hash != NO_HASH {
            self.out.find(entry.parent_hash).map(|(_, n)| if n.crop.is_empty() { n.rect } else { n.crop })
        } else {
            None
        };

        let start = match (anchor, entry.touch_anchor) {
            (Some(a), _) => {
                let mut x = a.start.x;
                let mut y = a.end().y;
                if y + size.y > win.y {
                    y = a.start.y - size.y;
                }
                if x + size.x > win.x {
                    x = a.end().x - size.x;
                }
                Vec2i::new(x, y)
            }
            (None, Some(p)) => {
                let x = if p.x + size.x > win.x { p.x - size.x } else { p.x };
                let y = if p.y + size.y > win.y { p.y - size.y } else { p.y };
                Vec2i::new(x, y)
            }
            (None, None) => Vec2i::new((win.x - size.x) / 2, (win.y - size.y) / 2),
        };

        let x = start.x.clamp(0, (win.x - size.x).max(0));
        let y = start.y.clamp(0, (win.y - size.y).max(0));
        RectPx::new(x, y, size.x, size.y)
    }

    /// Number of track positions: declared ones and the ones children occupy.
    fn track_count(node: &LayoutNode, axis: Axis) -> usize {
        let used = node
            .children
            .iter()
            .map(|c| {
                let (p, s) = grid_span(&c.key, axis);
                p + s
            })
            .max()
            .unwrap_or(0);
        node.tracks(axis).declared_len().max(used)
    }

    /// Solver inputs of one axis in cells: persisted resize overrides
    /// applied and from-child tracks narrowed to their child's size.
    fn track_inputs(&mut self, node: &LayoutNode, axis: Axis) -> Vec<TrackInput> {
        let mut sparse = Vec::new();
        for track in node.tracks(axis).iter() {
            let mut input = track.input();
            let (lo, hi) = (track.min.max(0.0), track.max.max(track.min).max(0.0));

            if let Some(fc) = track.from_child {
                let child = node.children.iter().find(|c| grid_span(&c.key, axis) == (track.pos, 1));
                if let Some(size) = child.and_then(|c| self.intrinsic_of(c)) {
                    let (cmin, cmax) = match axis {
                        Axis::X => (size.min.0, size.max.0),
                        Axis::Y => (size.min.1, size.max.1),
                    };
                    input.min = cmin.clamp(lo, hi);
                    input.max = if fc.fix { input.min } else { cmax.clamp(input.min, hi.max(input.min)) };
                }
            }
            if track.is_resizable() {
                if let Some(size) = self.settings.resize(node.hash, axis, track.pos) {
                    input.resize = Some(size);
                }
            }
            sparse.push((track.pos, input));
        }
        densify(sparse, Self::track_count(node, axis))
    }

    /// Self-size of a node in cells, `None` when it has no opinion.
    fn intrinsic_of(&mut self, node: &LayoutNode) -> Option<Intrinsic> {
        if let Some(known) = self.intrinsic.get(&node.hash) {
            return *known;
        }
        let size = if node.is_leaf() {
            node.auto_size.as_ref().map(|a| a.measure(self.measure, self.out.cell))
        } else {
            let cols = self.track_inputs(node, Axis::X);
            let rows = self.track_inputs(node, Axis::Y);
            let sum = |inputs: &[TrackInput]| -> (f32, f32) {
                inputs.iter().fold((0.0, 0.0), |(lo, hi), t| match t.resize {
                    Some(r) => (lo + r.max(0.0), hi + r.max(0.0)),
                    None => (lo + t.min.max(0.0), hi + t.max.max(t.min).max(0.0)),
                })
            };
            let (wmin, wmax) = sum(&cols);
            let (hmin, hmax) = sum(&rows);
            Some(Intrinsic {
                min: (wmin, hmin),
                max: (wmax, hmax),
            })
        };
        self.intrinsic.insert(node.hash, size);
        size
    }

    fn place(
        &mut self,
        node: &LayoutNode,
        rect: RectPx,
        parent_crop: RectPx,
        parent: Option<usize>,
        depth: u16,
        level: &mut Level,
    ) {
        self.settings.touch(node.hash);
        let cell = self.cell();

        let mut resolved = ResolvedNode {
            hash: node.hash,
            parent,
            depth,
            key: node.key.clone(),
            props: node.props.clone(),
            caps: node.caps,
            edit_value: node.edit_value.clone(),
            rect,
            canvas: rect,
            view: rect,
            crop: rect.intersect(&parent_crop),
            v_scroll: LayoutScroll::default(),
            h_scroll: LayoutScroll::default(),
            cols: Vec::new(),
            rows: Vec::new(),
            col_tracks: node.cols.clone(),
            row_tracks: node.rows.clone(),
            children: Vec::new(),
            dialogs: node.dialogs.clone(),
        };

        if node.is_leaf() {
            let idx = push_node(level, resolved);
            if let Some(p) = parent {
                level.nodes[p].children.push(idx);
            }
            return;
        }

        let col_inputs = self.track_inputs(node, Axis::X);
        let row_inputs = self.track_inputs(node, Axis::Y);
        let thickness = scroll_thickness(cell);

        let mut avail = rect.size;
        let mut cols = Vec::new();
        let mut rows = Vec::new();
        let (mut need_v, mut need_h) = (false, false);
        for _ in 0..SCROLL_ROUNDS {
            cols = solver::solve(avail.x, cell, &col_inputs);
            rows = solver::solve(avail.y, cell, &row_inputs);
            need_v = node.props.scroll_v && solver::total(&rows) > avail.y;
            need_h = node.props.scroll_h && solver::total(&cols) > avail.x;
            let next = Vec2i::new(
                rect.size.x - if need_v { thickness } else { 0 },
                rect.size.y - if need_h { thickness } else { 0 },
            );
            if next == avail {
                break;
            }
            avail = next;
        }

        let data = Vec2i::new(solver::total(&cols), solver::total(&rows));
        let v_scroll = self.scroll_for(node.hash, Axis::Y, need_v, data.y, avail.y);
        let h_scroll = self.scroll_for(node.hash, Axis::X, need_h, data.x, avail.x);

        let canvas = RectPx {
            start: rect.start.sub(Vec2i::new(h_scroll.wheel, v_scroll.wheel)),
            size: data,
        };
        let inner = RectPx {
            start: rect.start,
            size: Vec2i::new(avail.x.max(0), avail.y.max(0)),
        };
        let view = canvas.intersect(&inner);
        let crop = view.intersect(&parent_crop);

        resolved.canvas = canvas;
        resolved.view = view;
        resolved.crop = crop;
        resolved.v_scroll = v_scroll;
        resolved.h_scroll = h_scroll;
        resolved.cols = cols;
        resolved.rows = rows;

        let idx = push_node(level, resolved);
        if let Some(p) = parent {
            level.nodes[p].children.push(idx);
        }

        for child in &node.children {
            let (x, w) = grid_span(&child.key, Axis::X);
            let (y, h) = grid_span(&child.key, Axis::Y);
            let n = &level.nodes[idx];
            let child_rect = RectPx::new(
                canvas.start.x.saturating_add(solver::offset_of(&n.cols, x)),
                canvas.start.y.saturating_add(solver::offset_of(&n.rows, y)),
                solver::span_of(&n.cols, x, w),
                solver::span_of(&n.rows, y, h),
            );
            self.place(child, child_rect, crop, Some(idx), depth.saturating_add(1), level);
        }
    }

    /// Scroll state of one axis from the persisted wheel, clamped and written
    /// back when it changed.
    fn scroll_for(&mut self, hash: NodeHash, axis: Axis, needed: bool, data: i32, screen: i32) -> LayoutScroll {
        let stored = self.settings.scroll(hash, axis);
        if !needed {
            if stored != 0 {
                self.settings.set_scroll(hash, axis, 0);
            }
            return LayoutScroll {
                wheel: 0,
                data: data.min(screen),
                screen,
            };
        }
        let scroll = LayoutScroll::new(stored, data, screen);
        if scroll.wheel != stored {
            self.settings.set_scroll(hash, axis, scroll.wheel);
        }
        scroll
    }
}

fn push_node(level: &mut Level, node: ResolvedNode) -> usize {
    let idx = level.nodes.len();
    level.index.insert(node.hash, idx);
    level.nodes.push(node);
    idx
}

/// `(position, span)` of a child on one axis; spans are at least one track.
fn grid_span(key: &NodeKey, axis: Axis) -> (usize, usize) {
    let (p, s) = match axis {
        Axis::X => (key.x, key.w),
        Axis::Y => (key.y, key.h),
    };
    (p.max(0) as usize, s.max(1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ROOT_HASH;
    use crate::scroll::PIN_END;
    use crate::text::{AutoSize, MonoMeasure};

    fn node(hash: NodeHash, name: &str, x: i32, y: i32, w: i32, h: i32) -> LayoutNode {
        LayoutNode::new(hash, ROOT_HASH, NodeKey::new(name, x, y, w, h))
    }

    fn root() -> LayoutNode {
        LayoutNode::new(ROOT_HASH, NO_HASH, NodeKey::new("root", 0, 0, 1, 1))
    }

    fn resolve(settings: &mut Settings, root: &LayoutNode, window: Vec2i) -> ResolvedTree {
        let measure = MonoMeasure::default();
        let mut r = Resolver::new(settings, &measure, 40, window);
        r.resolve_root(root);
        r.finish()
    }

    #[test]
    fn flexible_and_fixed_columns() {
        let mut root = root();
        root.cols.set(0, 1.0, 100.0);
        root.cols.set(1, 3.0, 3.0);
        root.children.push(node(10, "A", 0, 0, 1, 1));
        root.children.push(node(11, "B", 1, 0, 1, 1));
        let mut settings = Settings::default();
        let tree = resolve(&mut settings, &root, Vec2i::new(400, 40));
        let level = &tree.levels[0];
        assert_eq!(level.nodes[0].cols, vec![280, 120]);
        assert_eq!(level.get(11).map(|n| n.rect), Some(RectPx::new(280, 0, 120, 40)));
    }

    fn long_list() -> LayoutNode {
        let mut root = root();
        root.cols.set(0, 1.0, 100.0);
        for i in 0..50 {
            root.children.push(node(100 + i as u64, "Row", 0, i, 1, 1));
        }
        root
    }

    #[test]
    fn pinned_scroll_resolves_to_the_end() {
        let root = long_list();
        let mut settings = Settings::default();
        settings.set_scroll(ROOT_HASH, Axis::Y, PIN_END);
        let tree = resolve(&mut settings, &root, Vec2i::new(400, 400));
        let r = &tree.levels[0].nodes[0];
        assert_eq!(r.v_scroll.wheel, 1600);
        assert_eq!(r.v_scroll.data, 2000);
        assert_eq!(r.crop.size.y, 400);
        assert_eq!(r.canvas.start.y, -1600);
        assert_eq!(settings.scroll(ROOT_HASH, Axis::Y), 1600);
    }

    #[test]
    fn vertical_bar_narrows_the_view() {
        let root = long_list();
        let mut settings = Settings::default();
        let tree = resolve(&mut settings, &root, Vec2i::new(400, 400));
        let r = &tree.levels[0].nodes[0];
        let th = scroll_thickness(40);
        assert_eq!(r.view.size.x, 400 - th);
        assert!(!r.h_scroll.is_active());
        assert_eq!(r.v_bar(th), Some(RectPx::new(400 - th, 0, th, 400)));
    }

    #[test]
    fn rect_chain_holds_for_every_node() {
        let mut root = long_list();
        let mut inner = node(7, "_layout", 0, 50, 1, 1);
        inner.cols.set(0, 20.0, 20.0);
        inner.children.push(node(8, "Wide", 0, 0, 1, 1));
        root.children.push(inner);
        let mut settings = Settings::default();
        settings.set_scroll(ROOT_HASH, Axis::Y, 900);
        let tree = resolve(&mut settings, &root, Vec2i::new(300, 300));
        for n in &tree.levels[0].nodes {
            assert!(n.canvas.contains_rect(&n.view), "{:?}", n.key);
            assert!(n.view.contains_rect(&n.crop), "{:?}", n.key);
            if !n.cols.is_empty() {
                assert_eq!(solver::total(&n.cols), n.canvas.size.x);
                assert_eq!(solver::total(&n.rows), n.canvas.size.y);
            }
        }
    }

    #[test]
    fn persisted_resize_overrides_the_declared_bounds() {
        let mut root = root();
        root.cols.set(0, 1.0, 1.0);
        root.cols.set_resizable(1, 1.0, 3.0, 3.0);
        let mut settings = Settings::default();
        settings.set_resize(ROOT_HASH, Axis::X, 1, 5.0);
        let tree = resolve(&mut settings, &root, Vec2i::new(1000, 40));
        assert_eq!(tree.levels[0].nodes[0].cols, vec![40, 200]);
    }

    #[test]
    fn empty_multiline_text_row_keeps_one_cell() {
        let mut root = root();
        root.rows.set_from_child(0, 0.0, 10.0, false);
        let mut text = node(5, "Text", 0, 0, 1, 1);
        text.auto_size = Some(AutoSize::Text {
            text: String::new(),
            multiline: true,
            linewrap: true,
            margin: 0.1,
            max_width: 5.0,
        });
        root.children.push(text);
        let mut settings = Settings::default();
        let tree = resolve(&mut settings, &root, Vec2i::new(400, 400));
        assert_eq!(tree.levels[0].nodes[0].rows, vec![40]);
    }

    #[test]
    fn from_child_track_follows_text_width() {
        let mut root = root();
        root.cols.set_from_child(0, 1.0, 20.0, true);
        root.cols.set(1, 1.0, 100.0);
        let mut text = node(5, "Text", 0, 0, 1, 1);
        // 8 chars * 0.5 + 0.2 margin = 4.2 cells
        text.auto_size = Some(AutoSize::text("abcdefgh"));
        root.children.push(text);
        let mut settings = Settings::default();
        let tree = resolve(&mut settings, &root, Vec2i::new(1000, 40));
        assert_eq!(tree.levels[0].nodes[0].cols[0], 168);
    }

    #[test]
    fn dialog_opens_below_its_anchor() {
        let mut root = root();
        root.cols.set(0, 2.5, 2.5);
        root.cols.set(1, 2.0, 2.0);
        root.rows.set(0, 5.0, 5.0);
        root.rows.set(1, 0.5, 0.5);
        root.children.push(node(50, "Button", 1, 1, 1, 1));

        let mut dialog = LayoutNode::new(60, ROOT_HASH, NodeKey::dialog("menu"));
        dialog.cols.set(0, 4.0, 4.0);
        dialog.rows.set(0, 3.0, 3.0);

        let mut settings = Settings::default();
        let measure = MonoMeasure::default();
        let mut r = Resolver::new(&mut settings, &measure, 40, Vec2i::new(800, 600));
        r.resolve_root(&root);
        let entry = DialogEntry {
            hash: 60,
            parent_hash: 50,
            touch_anchor: None,
        };
        r.resolve_dialog(&dialog, &entry);
        let tree = r.finish();

        let button = tree.levels[0].get(50).map(|n| n.rect);
        assert_eq!(button, Some(RectPx::new(100, 200, 80, 20)));
        assert_eq!(tree.levels[1].rect, RectPx::new(100, 220, 160, 120));
    }

    #[test]
    fn dialog_flips_and_shifts_at_the_window_edge() {
        let mut root = root();
        root.cols.set(0, 18.0, 18.0);
        root.cols.set(1, 2.0, 2.0);
        root.rows.set(0, 14.0, 14.0);
        root.rows.set(1, 1.0, 1.0);
        root.children.push(node(50, "Button", 1, 1, 1, 1));

        let mut dialog = LayoutNode::new(60, ROOT_HASH, NodeKey::dialog("menu"));
        dialog.cols.set(0, 4.0, 4.0);
        dialog.rows.set(0, 3.0, 3.0);

        let mut settings = Settings::default();
        let measure = MonoMeasure::default();
        let mut r = Resolver::new(&mut settings, &measure, 40, Vec2i::new(800, 600));
        r.resolve_root(&root);
        let entry = DialogEntry {
            hash: 60,
            parent_hash: 50,
            touch_anchor: None,
        };
        r.resolve_dialog(&dialog, &entry);
        let tree = r.finish();
        // button at (720, 560, 80, 40): above it, right edges aligned
        assert_eq!(tree.levels[1].rect, RectPx::new(640, 440, 160, 120));
    }

    #[test]
    fn dialog_without_anchor_is_centered_and_clamped() {
        let mut dialog = LayoutNode::new(60, ROOT_HASH, NodeKey::dialog("big"));
        dialog.cols.set(0, 100.0, 100.0);
        dialog.rows.set(0, 2.0, 2.0);
        let mut settings = Settings::default();
        let measure = MonoMeasure::default();
        let mut r = Resolver::new(&mut settings, &measure, 40, Vec2i::new(800, 600));
        r.resolve_root(&root());
        let entry = DialogEntry {
            hash: 60,
            parent_hash: NO_HASH,
            touch_anchor: None,
        };
        r.resolve_dialog(&dialog, &entry);
        let tree = r.finish();
        assert_eq!(tree.levels[1].rect, RectPx::new(0, 260, 800, 80));
        let d = &tree.levels[1].nodes[0];
        assert!(d.h_scroll.is_active());
    }

    #[test]
    fn dialog_with_unbounded_columns_fills_the_window() {
        let mut dialog = LayoutNode::new(60, ROOT_HASH, NodeKey::dialog("wide"));
        for i in 0..5 {
            dialog.cols.set(i, 1.0, f32::MAX);
        }
        dialog.rows.set(0, 2.0, 2.0);
        let mut settings = Settings::default();
        let measure = MonoMeasure::default();
        let mut r = Resolver::new(&mut settings, &measure, 40, Vec2i::new(800, 600));
        r.resolve_root(&root());
        let entry = DialogEntry {
            hash: 60,
            parent_hash: NO_HASH,
            touch_anchor: None,
        };
        r.resolve_dialog(&dialog, &entry);
        let tree = r.finish();
        assert_eq!(tree.levels[1].rect, RectPx::new(0, 260, 800, 80));
        assert_eq!(solver::total(&tree.levels[1].nodes[0].cols), 800);
    }

    #[test]
    fn hit_prefers_the_deepest_node() {
        let mut root = root();
        root.cols.set(0, 5.0, 5.0);
        let mut inner = node(7, "_layout", 0, 0, 1, 1);
        inner.cols.set(0, 1.0, 1.0);
        inner.children.push(node(8, "Leaf", 0, 0, 1, 1));
        root.children.push(inner);
        let mut settings = Settings::default();
        let tree = resolve(&mut settings, &root, Vec2i::new(400, 400));
        let level = &tree.levels[0];
        let hit = level.hit(Vec2i::new(10, 10)).map(|i| level.nodes[i].hash);
        assert_eq!(hit, Some(8));
        let hit = level.hit(Vec2i::new(100, 10)).map(|i| level.nodes[i].hash);
        assert_eq!(hit, Some(ROOT_HASH));
        let chain: Vec<NodeHash> = level.ancestors(2).map(|i| level.nodes[i].hash).collect();
        assert_eq!(chain, vec![8, 7, ROOT_HASH]);
    }

    #[test]
    fn resolving_touches_every_hash() {
        let root = long_list();
        let mut settings = Settings::default();
        settings.set_scroll(12345, Axis::Y, 10);
        settings.set_scroll(ROOT_HASH, Axis::Y, 10);
        settings.begin_refresh();
        resolve(&mut settings, &root, Vec2i::new(400, 400));
        assert_eq!(settings.maintenance(), 1);
        assert_eq!(settings.scroll(ROOT_HASH, Axis::Y), 10);
    }
}
