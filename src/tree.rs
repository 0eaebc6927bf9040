//! Widget-side layout tree.
//!
//! Nodes live in an arena indexed by `usize` with a hash index on the side.
//! Every refresh rebuilds the tree from the root `build` callback; a child
//! added with the same key as in the previous build reuses its node and
//! keeps its hash, so host-side state keyed by hash survives the rebuild.

use std::mem;
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashMap;
use tracing::{debug, error};

use crate::commands::Commands;
use crate::elements::NodeProps;
use crate::env::Environment;
use crate::id::{NodeHash, NodeKey, NO_HASH, ROOT_HASH};
use crate::input::{DropMove, LayoutInput};
use crate::jobs::Jobs;
use crate::layout::{Axis, Tracks};
use crate::math::CellRect;
use crate::node::{Caps, LayoutNode};
use crate::render_commands::{DrawPrim, Paint};
use crate::text::AutoSize;

pub type BuildFn = Box<dyn FnMut(&mut Layout<'_>)>;
pub type DrawFn = Box<dyn FnMut(CellRect, &mut Paint, &Environment)>;
pub type InputFn = Box<dyn FnMut(&LayoutInput, &mut WidgetCtx)>;
pub type SetEditFn = Box<dyn FnMut(&str, bool, &mut WidgetCtx)>;
pub type GetEditFn = Box<dyn FnMut() -> String>;
pub type ShortcutFn = Box<dyn FnMut(char) -> bool>;
pub type DropFileFn = Box<dyn FnMut(&str, &mut WidgetCtx)>;
pub type DropMoveFn = Box<dyn FnMut(&DropMove, &mut WidgetCtx)>;
pub type AutoResizeFn = Box<dyn FnMut(&Environment) -> AutoSize>;

/// Optional callback slots of a node.
#[derive(Default)]
pub struct Callbacks {
    pub build: Option<BuildFn>,
    pub draw: Option<DrawFn>,
    pub input: Option<InputFn>,
    pub set_editbox: Option<SetEditFn>,
    pub get_editbox: Option<GetEditFn>,
    pub has_shortcut: Option<ShortcutFn>,
    pub drop_file: Option<DropFileFn>,
    pub drop_move: Option<DropMoveFn>,
    pub auto_resize: Option<AutoResizeFn>,
}

impl Callbacks {
    fn caps(&self) -> Caps {
        Caps {
            draw: self.draw.is_some(),
            input: self.input.is_some(),
            edit: self.set_editbox.is_some() && self.get_editbox.is_some(),
            shortcut: self.has_shortcut.is_some(),
            drop_file: self.drop_file.is_some(),
            drop_move: self.drop_move.is_some(),
        }
    }
}

/// Context threaded through build and input callbacks.
#[derive(Default)]
pub struct WidgetCtx {
    pub cmds: Commands,
    pub jobs: Jobs,
    pub env: Environment,
}

impl WidgetCtx {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }
}

struct Node {
    key: NodeKey,
    hash: NodeHash,
    parent: Option<usize>,
    cols: Tracks,
    rows: Tracks,
    props: NodeProps,
    callbacks: Callbacks,
    children: Vec<usize>,
    dialogs: Vec<usize>,
    /// Children of the previous build not re-added yet.
    stash: Vec<usize>,
    stashed: bool,
    alive: bool,
}

impl Node {
    fn new(key: NodeKey, hash: NodeHash, parent: Option<usize>) -> Self {
        Self {
            key,
            hash,
            parent,
            cols: Tracks::new(),
            rows: Tracks::new(),
            props: NodeProps::default(),
            callbacks: Callbacks::default(),
            children: Vec::new(),
            dialogs: Vec::new(),
            stash: Vec::new(),
            stashed: false,
            alive: true,
        }
    }
}

const ROOT: usize = 0;

pub struct Tree {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: FxHashMap<NodeHash, usize>,
    root_build: Option<BuildFn>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        let mut index = FxHashMap::default();
        index.insert(ROOT_HASH, ROOT);
        Self {
            nodes: vec![Node::new(NodeKey::new("root", 0, 0, 1, 1), ROOT_HASH, None)],
            free: Vec::new(),
            index,
            root_build: None,
        }
    }

    /// Registers the application's root build function.
    pub fn set_root<F>(&mut self, build: F)
    where
        F: FnMut(&mut Layout<'_>) + 'static,
    {
        self.root_build = Some(Box::new(build));
    }

    pub fn root_hash(&self) -> NodeHash {
        ROOT_HASH
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub fn contains(&self, hash: NodeHash) -> bool {
        self.index.contains_key(&hash)
    }

    pub fn key(&self, hash: NodeHash) -> Option<&NodeKey> {
        self.index.get(&hash).map(|&i| &self.nodes[i].key)
    }

    pub fn parent_hash(&self, hash: NodeHash) -> Option<NodeHash> {
        let id = *self.index.get(&hash)?;
        Some(self.nodes[id].parent.map(|p| self.nodes[p].hash).unwrap_or(NO_HASH))
    }

    /// Rebuilds the whole tree. A panicking callback aborts the build and
    /// leaves an empty tree; returns false in that case.
    pub fn rebuild(&mut self, ctx: &mut WidgetCtx) -> bool {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.reset(ROOT);
            self.build_node(ROOT, ctx);
        }));
        match result {
            Ok(()) => {
                debug!(nodes = self.len(), "tree rebuilt");
                true
            }
            Err(payload) => {
                error!("build aborted: {}", panic_message(payload.as_ref()));
                self.clear();
                false
            }
        }
    }

    /// Drops every node except the root.
    pub fn clear(&mut self) {
        let root = Node::new(NodeKey::new("root", 0, 0, 1, 1), ROOT_HASH, None);
        self.nodes.truncate(1);
        self.nodes[ROOT] = root;
        self.free.clear();
        self.index.clear();
        self.index.insert(ROOT_HASH, ROOT);
    }

    fn reset(&mut self, id: usize) {
        let node = &mut self.nodes[id];
        node.cols.clear();
        node.rows.clear();
        node.props = NodeProps::default();
        node.callbacks = Callbacks::default();
        let mut old = mem::take(&mut node.children);
        old.append(&mut node.dialogs);
        for &c in &old {
            self.nodes[c].stashed = true;
        }
        self.nodes[id].stash.extend(old);
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(i) => {
                self.nodes[i] = node;
                i
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Returns the child of `parent` with `key`, reusing the node of the
    /// previous build when there is one.
    ///
    /// Panics when `parent` already received a child with the same key during
    /// this build, or when the hash collides with an unrelated node.
    fn create_child(&mut self, parent: usize, key: NodeKey) -> usize {
        let parent_hash = self.nodes[parent].hash;
        let hash = key.hash_under(parent_hash);
        let is_dialog = key.is_dialog();

        let id = match self.index.get(&hash).copied() {
            Some(i) => {
                let n = &self.nodes[i];
                if !(n.stashed && n.parent == Some(parent) && n.key == key) {
                    panic!("duplicate node {key:?} under {parent_hash:#x}");
                }
                self.nodes[i].stashed = false;
                self.reset(i);
                i
            }
            None => {
                let i = self.alloc(Node::new(key, hash, Some(parent)));
                self.index.insert(hash, i);
                i
            }
        };

        let p = &mut self.nodes[parent];
        if is_dialog {
            p.dialogs.push(id);
        } else {
            p.children.push(id);
        }
        id
    }

    fn remove_subtree(&mut self, id: usize) {
        let mut stack = vec![id];
        while let Some(i) = stack.pop() {
            let node = &mut self.nodes[i];
            if !node.alive {
                continue;
            }
            node.alive = false;
            stack.append(&mut node.children);
            stack.append(&mut node.dialogs);
            stack.append(&mut node.stash);
            node.callbacks = Callbacks::default();
            let hash = node.hash;
            if self.index.get(&hash) == Some(&i) {
                self.index.remove(&hash);
            }
            self.free.push(i);
        }
    }

    /// Removes children of `id` that the build did not re-add.
    fn sweep(&mut self, id: usize) {
        for s in mem::take(&mut self.nodes[id].stash) {
            let n = &self.nodes[s];
            if n.alive && n.stashed && n.parent == Some(id) {
                self.remove_subtree(s);
            }
        }
    }

    fn build_node(&mut self, id: usize, ctx: &mut WidgetCtx) {
        self.run_build(id, ctx);
        self.sweep(id);
        let node = &self.nodes[id];
        let kids: Vec<usize> = node.children.iter().chain(node.dialogs.iter()).copied().collect();
        for k in kids {
            self.build_node(k, ctx);
        }
    }

    fn run_build(&mut self, id: usize, ctx: &mut WidgetCtx) {
        let taken = if id == ROOT {
            self.root_build.take()
        } else {
            self.nodes[id].callbacks.build.take()
        };
        let Some(mut f) = taken else {
            return;
        };

        let result = {
            let mut layout = Layout { tree: self, ctx, id };
            panic::catch_unwind(AssertUnwindSafe(|| f(&mut layout)))
        };

        if id == ROOT {
            self.root_build = Some(f);
        } else if self.nodes[id].callbacks.build.is_none() {
            self.nodes[id].callbacks.build = Some(f);
        }
        if let Err(payload) = result {
            panic::resume_unwind(payload);
        }
    }

    /// Serializable view of the subtree at `hash`, dialogs by hash only.
    pub fn snapshot(&mut self, hash: NodeHash, env: &Environment) -> Option<LayoutNode> {
        let id = *self.index.get(&hash)?;
        Some(self.snapshot_node(id, env))
    }

    fn snapshot_node(&mut self, id: usize, env: &Environment) -> LayoutNode {
        let parent_hash = self.nodes[id].parent.map(|p| self.nodes[p].hash).unwrap_or(NO_HASH);
        let dialogs: Vec<NodeHash> = self.nodes[id].dialogs.iter().map(|&d| self.nodes[d].hash).collect();

        let node = &mut self.nodes[id];
        let auto_size = node.callbacks.auto_resize.as_mut().map(|f| f(env));
        let edit_value = node.callbacks.get_editbox.as_mut().map(|f| f());
        let mut out = LayoutNode {
            hash: node.hash,
            parent_hash,
            key: node.key.clone(),
            cols: node.cols.clone(),
            rows: node.rows.clone(),
            props: node.props.clone(),
            caps: node.callbacks.caps(),
            auto_size,
            edit_value,
            children: Vec::with_capacity(node.children.len()),
            dialogs,
        };

        let kids = node.children.clone();
        for k in kids {
            out.children.push(self.snapshot_node(k, env));
        }
        out
    }

    /// Runs the draw callback of `hash` for a canvas of `rect` cells.
    /// Returns `None` when the node is gone or draws nothing.
    pub fn draw(&mut self, hash: NodeHash, rect: CellRect, env: &Environment) -> Option<Vec<DrawPrim>> {
        let id = *self.index.get(&hash)?;
        let f = self.nodes[id].callbacks.draw.as_mut()?;
        let mut paint = Paint::new();
        f(rect, &mut paint, env);
        Some(paint.into_prims())
    }

    /// Delivers `input` to `hash`. Edit values, moves and dropped files go to
    /// their dedicated callbacks; everything else to `input`. Returns false
    /// when the node or the callback is missing.
    pub fn input(&mut self, hash: NodeHash, input: &LayoutInput, ctx: &mut WidgetCtx) -> bool {
        let Some(&id) = self.index.get(&hash) else {
            return false;
        };
        let cb = &mut self.nodes[id].callbacks;

        if let Some(edit) = &input.set_edit {
            return match cb.set_editbox.as_mut() {
                Some(f) => {
                    f(&edit.value, edit.commit, ctx);
                    true
                }
                None => false,
            };
        }
        if let Some(mv) = &input.drop_move {
            if mv.is_noop() {
                return true;
            }
            return match cb.drop_move.as_mut() {
                Some(f) => {
                    f(mv, ctx);
                    true
                }
                None => false,
            };
        }
        if let Some(path) = &input.drop_file {
            return match cb.drop_file.as_mut() {
                Some(f) => {
                    f(path, ctx);
                    true
                }
                None => false,
            };
        }
        match cb.input.as_mut() {
            Some(f) => {
                f(input, ctx);
                true
            }
            None => false,
        }
    }

    /// First node in the subtree of `from` (pre-order, dialogs excluded) that
    /// handles the shortcut `key`.
    pub fn find_shortcut(&mut self, from: NodeHash, key: char) -> Option<NodeHash> {
        let start = *self.index.get(&from)?;
        let key = key.to_ascii_lowercase();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id];
            if !node.props.can_touch() {
                continue;
            }
            let by_prop = node.props.shortcut == Some(key);
            let by_callback = node.callbacks.has_shortcut.as_mut().map(|f| f(key)).unwrap_or(false);
            if by_prop || by_callback {
                return Some(node.hash);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    pub fn hashes(&self) -> impl Iterator<Item = NodeHash> + '_ {
        self.index.keys().copied()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handle passed to `build` callbacks for configuring one node.
pub struct Layout<'a> {
    tree: &'a mut Tree,
    ctx: &'a mut WidgetCtx,
    id: usize,
}

impl<'a> Layout<'a> {
    fn node(&mut self) -> &mut Node {
        &mut self.tree.nodes[self.id]
    }

    pub fn hash(&self) -> NodeHash {
        self.tree.nodes[self.id].hash
    }

    pub fn key(&self) -> &NodeKey {
        &self.tree.nodes[self.id].key
    }

    pub fn env(&self) -> &Environment {
        &self.ctx.env
    }

    pub fn cmds(&mut self) -> &mut Commands {
        &mut self.ctx.cmds
    }

    pub fn jobs(&mut self) -> &mut Jobs {
        &mut self.ctx.jobs
    }

    pub fn ctx(&mut self) -> &mut WidgetCtx {
        self.ctx
    }

    fn tracks(&mut self, axis: Axis) -> &mut Tracks {
        let node = self.node();
        match axis {
            Axis::X => &mut node.cols,
            Axis::Y => &mut node.rows,
        }
    }

    #[inline]
    pub fn set_column(&mut self, pos: usize, min: f32, max: f32) -> &mut Self {
        self.tracks(Axis::X).set(pos, min, max);
        self
    }

    #[inline]
    pub fn set_row(&mut self, pos: usize, min: f32, max: f32) -> &mut Self {
        self.tracks(Axis::Y).set(pos, min, max);
        self
    }

    /// Sizes column `pos` from the child placed in it.
    #[inline]
    pub fn set_column_from_sub(&mut self, pos: usize, min: f32, max: f32, fix: bool) -> &mut Self {
        self.tracks(Axis::X).set_from_child(pos, min, max, fix);
        self
    }

    #[inline]
    pub fn set_row_from_sub(&mut self, pos: usize, min: f32, max: f32, fix: bool) -> &mut Self {
        self.tracks(Axis::Y).set_from_child(pos, min, max, fix);
        self
    }

    #[inline]
    pub fn set_column_resizable(&mut self, pos: usize, min: f32, max: f32, default: f32) -> &mut Self {
        self.tracks(Axis::X).set_resizable(pos, min, max, default);
        self
    }

    #[inline]
    pub fn set_row_resizable(&mut self, pos: usize, min: f32, max: f32, default: f32) -> &mut Self {
        self.tracks(Axis::Y).set_resizable(pos, min, max, default);
        self
    }

    #[inline]
    pub fn set_column_fill(&mut self, pos: usize, weight: f32) -> &mut Self {
        self.tracks(Axis::X).set_fill(pos, weight);
        self
    }

    #[inline]
    pub fn set_row_fill(&mut self, pos: usize, weight: f32) -> &mut Self {
        self.tracks(Axis::Y).set_fill(pos, weight);
        self
    }

    /// Presentation fields of this node.
    pub fn props(&mut self) -> &mut NodeProps {
        &mut self.node().props
    }

    /// Adds a child with a widget-class `name` at grid cell `(x, y)` spanning
    /// `w × h` cells.
    pub fn add_child(&mut self, name: &str, x: i32, y: i32, w: i32, h: i32) -> Layout<'_> {
        let id = self.tree.create_child(self.id, NodeKey::new(name, x, y, w, h));
        Layout {
            tree: self.tree,
            ctx: self.ctx,
            id,
        }
    }

    /// Adds a plain grid container.
    pub fn add_layout(&mut self, x: i32, y: i32, w: i32, h: i32) -> Layout<'_> {
        self.add_child("_layout", x, y, w, h)
    }

    /// Adds a detached dialog. It is only shown once opened with a command.
    pub fn add_dialog(&mut self, name: &str) -> Layout<'_> {
        let id = self.tree.create_child(self.id, NodeKey::dialog(name));
        Layout {
            tree: self.tree,
            ctx: self.ctx,
            id,
        }
    }

    pub fn on_build<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut Layout<'_>) + 'static,
    {
        self.node().callbacks.build = Some(Box::new(f));
        self
    }

    pub fn on_draw<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(CellRect, &mut Paint, &Environment) + 'static,
    {
        self.node().callbacks.draw = Some(Box::new(f));
        self
    }

    pub fn on_input<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&LayoutInput, &mut WidgetCtx) + 'static,
    {
        self.node().callbacks.input = Some(Box::new(f));
        self
    }

    /// Makes the node an editbox: `get` reads the current value, `set`
    /// receives edits with a commit flag.
    pub fn on_editbox<G, S>(&mut self, get: G, set: S) -> &mut Self
    where
        G: FnMut() -> String + 'static,
        S: FnMut(&str, bool, &mut WidgetCtx) + 'static,
    {
        let cb = &mut self.node().callbacks;
        cb.get_editbox = Some(Box::new(get));
        cb.set_editbox = Some(Box::new(set));
        self
    }

    pub fn on_shortcut<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(char) -> bool + 'static,
    {
        self.node().callbacks.has_shortcut = Some(Box::new(f));
        self
    }

    pub fn on_drop_file<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&str, &mut WidgetCtx) + 'static,
    {
        self.node().callbacks.drop_file = Some(Box::new(f));
        self
    }

    pub fn on_drop_move<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&DropMove, &mut WidgetCtx) + 'static,
    {
        self.node().callbacks.drop_move = Some(Box::new(f));
        self
    }

    pub fn on_auto_resize<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&Environment) -> AutoSize + 'static,
    {
        self.node().callbacks.auto_resize = Some(Box::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DropPos, SetEdit};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn build(tree: &mut Tree) -> bool {
        let mut ctx = WidgetCtx::default();
        tree.rebuild(&mut ctx)
    }

    #[test]
    fn rebuild_keeps_hashes_of_unchanged_children() {
        let rows = Rc::new(Cell::new(3));
        let mut tree = Tree::new();
        let r = rows.clone();
        tree.set_root(move |l| {
            l.set_column(0, 1.0, 10.0);
            for y in 0..r.get() {
                l.add_child("Text", 0, y, 1, 1);
            }
        });
        assert!(build(&mut tree));
        assert_eq!(tree.len(), 4);
        let before: Vec<NodeHash> = tree.hashes().collect();

        assert!(build(&mut tree));
        let mut after: Vec<NodeHash> = tree.hashes().collect();
        let mut before_sorted = before.clone();
        before_sorted.sort_unstable();
        after.sort_unstable();
        assert_eq!(before_sorted, after);

        rows.set(1);
        assert!(build(&mut tree));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn child_builds_run_after_the_parent() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut tree = Tree::new();
        let o = order.clone();
        tree.set_root(move |l| {
            o.borrow_mut().push("root");
            let o2 = o.clone();
            l.add_layout(0, 0, 1, 1).on_build(move |inner| {
                o2.borrow_mut().push("child");
                inner.add_child("Text", 0, 0, 1, 1);
            });
        });
        assert!(build(&mut tree));
        assert!(build(&mut tree));
        assert_eq!(*order.borrow(), vec!["root", "child", "root", "child"]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn duplicate_sibling_aborts_the_build() {
        let mut tree = Tree::new();
        tree.set_root(|l| {
            l.add_child("Button", 0, 0, 1, 1);
            l.add_child("Button", 0, 0, 1, 1);
        });
        assert!(!build(&mut tree));
        assert!(tree.is_empty());

        // the root build survives the panic and fails again the same way
        assert!(!build(&mut tree));
    }

    #[test]
    fn dialogs_are_listed_by_hash_in_snapshots() {
        let mut tree = Tree::new();
        tree.set_root(|l| {
            l.add_child("Button", 0, 0, 1, 1);
            l.add_dialog("menu").set_column(0, 4.0, 4.0).add_child("Text", 0, 0, 1, 1);
        });
        assert!(build(&mut tree));
        let env = Environment::default();
        let snap = tree.snapshot(ROOT_HASH, &env).unwrap();
        assert_eq!(snap.children.len(), 1);
        assert_eq!(snap.dialogs.len(), 1);

        let dialog = tree.snapshot(snap.dialogs[0], &env).unwrap();
        assert!(dialog.key.is_dialog());
        assert_eq!(dialog.parent_hash, ROOT_HASH);
        assert_eq!(dialog.children.len(), 1);
    }

    #[test]
    fn draw_and_input_dispatch() {
        let clicks = Rc::new(Cell::new(0));
        let mut tree = Tree::new();
        let c = clicks.clone();
        tree.set_root(move |l| {
            let c = c.clone();
            l.add_child("Button", 0, 0, 1, 1)
                .on_draw(|rect, paint, env| {
                    paint.rect(rect, env.palette().primary);
                })
                .on_input(move |input, ctx| {
                    if input.is_clicked(1, false) {
                        c.set(c.get() + 1);
                        ctx.cmds.refresh();
                    }
                });
        });
        assert!(build(&mut tree));
        let env = Environment::default();
        let button = tree.snapshot(ROOT_HASH, &env).unwrap().children[0].hash;

        let prims = tree.draw(button, CellRect::sized(2.0, 1.0), &env).unwrap();
        assert_eq!(prims.len(), 1);
        assert!(tree.draw(ROOT_HASH, CellRect::sized(1.0, 1.0), &env).is_none());

        let mut ctx = WidgetCtx::default();
        let click = LayoutInput {
            is_end: true,
            is_inside: true,
            num_clicks: 1,
            ..Default::default()
        };
        assert!(tree.input(button, &click, &mut ctx));
        assert_eq!(clicks.get(), 1);
        assert_eq!(ctx.cmds.len(), 1);
        assert!(!tree.input(12345, &click, &mut ctx));
    }

    #[test]
    fn edit_values_and_moves_use_their_own_callbacks() {
        let value = Rc::new(RefCell::new(String::from("abc")));
        let moves = Rc::new(Cell::new(0));
        let mut tree = Tree::new();
        let (v, m) = (value.clone(), moves.clone());
        tree.set_root(move |l| {
            let (get, set) = (v.clone(), v.clone());
            l.add_child("Editbox", 0, 0, 1, 1).on_editbox(
                move || get.borrow().clone(),
                move |text, commit, _| {
                    if commit {
                        *set.borrow_mut() = text.to_string();
                    }
                },
            );
            let m = m.clone();
            l.add_child("Item", 0, 1, 1, 1)
                .on_drop_move(move |_, _| m.set(m.get() + 1));
        });
        assert!(build(&mut tree));
        let env = Environment::default();
        let snap = tree.snapshot(ROOT_HASH, &env).unwrap();
        assert_eq!(snap.children[0].edit_value.as_deref(), Some("abc"));
        assert!(snap.children[0].caps.edit);

        let mut ctx = WidgetCtx::default();
        let edit = LayoutInput {
            set_edit: Some(SetEdit {
                value: "abcd".into(),
                commit: true,
            }),
            ..Default::default()
        };
        assert!(tree.input(snap.children[0].hash, &edit, &mut ctx));
        assert_eq!(*value.borrow(), "abcd");

        let mut mv = DropMove {
            src_i: 3,
            dst_i: 3,
            src_source: "l".into(),
            dst_source: "l".into(),
            pos: DropPos::VerticalBefore,
        };
        let drop = |mv: &DropMove| LayoutInput {
            drop_move: Some(mv.clone()),
            ..Default::default()
        };
        tree.input(snap.children[1].hash, &drop(&mv), &mut ctx);
        assert_eq!(moves.get(), 0);
        mv.dst_i = 0;
        tree.input(snap.children[1].hash, &drop(&mv), &mut ctx);
        assert_eq!(moves.get(), 1);
    }

    #[test]
    fn shortcut_search_is_pre_order() {
        let mut tree = Tree::new();
        tree.set_root(|l| {
            let mut box_ = l.add_layout(0, 0, 1, 1);
            box_.add_child("Button", 0, 0, 1, 1).props().shortcut('s');
            l.add_child("Button", 0, 1, 1, 1).on_shortcut(|k| k == 's' || k == 'o');
        });
        assert!(build(&mut tree));
        let env = Environment::default();
        let snap = tree.snapshot(ROOT_HASH, &env).unwrap();
        let nested = snap.children[0].children[0].hash;
        assert_eq!(tree.find_shortcut(ROOT_HASH, 'S'), Some(nested));
        assert_eq!(tree.find_shortcut(ROOT_HASH, 'o'), Some(snap.children[1].hash));
        assert_eq!(tree.find_shortcut(ROOT_HASH, 'x'), None);
    }

    #[test]
    fn reused_node_loses_stale_callbacks() {
        let with_draw = Rc::new(Cell::new(true));
        let mut tree = Tree::new();
        let w = with_draw.clone();
        tree.set_root(move |l| {
            let mut child = l.add_child("Text", 0, 0, 1, 1);
            if w.get() {
                child.on_draw(|_, _, _| {});
            }
        });
        assert!(build(&mut tree));
        let env = Environment::default();
        assert!(tree.snapshot(ROOT_HASH, &env).unwrap().children[0].caps.draw);
        with_draw.set(false);
        assert!(build(&mut tree));
        assert!(!tree.snapshot(ROOT_HASH, &env).unwrap().children[0].caps.draw);
    }
}
