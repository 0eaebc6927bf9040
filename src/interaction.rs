//! Host-side interaction state machine.
//!
//! Runs once per frame over the last resolved [`Frame`]. Scroll and resize
//! drags, dialog dismissal, hover, cursors and tooltips are handled locally;
//! everything the widget must see comes out as [`NodeEvent`]s for `INPUT`.

use tracing::debug;

use crate::commands::LayoutCmd;
use crate::diff::Frame;
use crate::elements::DragSource;
use crate::env::Environment;
use crate::id::{NodeHash, NO_HASH};
use crate::input::{DropMove, DropPos, Key, LayoutInput, Modifiers, RawInput, SetEdit};
use crate::layout::Axis;
use crate::math::{CellRect, RectPx, Vec2i};
use crate::render_commands::{CursorIcon, DrawPrim};
use crate::resolve::{Level, ResolvedNode};
use crate::scroll::LayoutScroll;
use crate::settings::Settings;
use crate::text_input::{EditEvent, EditState};

/// Presses on the same node within this many seconds count as one
/// multi-click.
pub const DOUBLE_CLICK_SECS: f64 = 0.4;
/// Hover time before a tooltip shows.
pub const TOOLTIP_DELAY_SECS: f64 = 0.5;
/// Width of a resizer hit region in pixels, starting at the track boundary.
const RESIZER_WIDTH: i32 = 1;
/// Smallest size a resizer drag can produce, in cells.
const MIN_RESIZE: f32 = 0.1;

/// One `INPUT` message.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEvent {
    pub hash: NodeHash,
    pub input: LayoutInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipOut {
    pub text: String,
    /// Window rectangle the tooltip points at.
    pub anchor: RectPx,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    pub events: Vec<NodeEvent>,
    /// Persisted state changed (scroll, resize, dialogs); resolve again.
    pub needs_refresh: bool,
    /// DPI changed; push the environment and refresh.
    pub env_changed: bool,
    pub cursor: CursorIcon,
    pub tooltip: Option<TooltipOut>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    hash: NodeHash,
    right: bool,
    clicks: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollDrag {
    hash: NodeHash,
    axis: Axis,
    bar_start: i32,
    track: i32,
    grab: i32,
    scroll: LayoutScroll,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeDrag {
    hash: NodeHash,
    axis: Axis,
    pos: usize,
    origin: i32,
    start_cells: f32,
    min_cells: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct DragState {
    hash: NodeHash,
    source: DragSource,
    over: Option<(NodeHash, DropMove)>,
}

#[derive(Debug, Default)]
pub struct Interaction {
    press: Option<Press>,
    scroll_drag: Option<ScrollDrag>,
    resize_drag: Option<ResizeDrag>,
    drag: Option<DragState>,
    edit: Option<EditState>,
    last_click: Option<(NodeHash, f64, u8)>,
    hover: Option<NodeHash>,
    hover_since: f64,
    prev_left: bool,
    prev_right: bool,
    prev_pointer: Vec2i,
    prev_time: f64,
    /// Text of the last copy or `SetClipboard`; the renderer mirrors it to
    /// the system clipboard.
    pub clipboard: String,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    /// The renderer resolves pending clicks and keeps the caret in view.
    pub fn edit_mut(&mut self) -> Option<&mut EditState> {
        self.edit.as_mut()
    }

    pub fn hovered(&self) -> Option<NodeHash> {
        self.hover
    }

    /// Hash holding the current press.
    pub fn pressed(&self) -> Option<NodeHash> {
        self.press.map(|p| p.hash)
    }

    /// Current drop destination and position, for the renderer's marker.
    pub fn drop_target(&self) -> Option<(NodeHash, DropPos)> {
        self.drag.as_ref().and_then(|d| d.over.as_ref()).map(|(h, m)| (*h, m.pos))
    }

    pub fn is_dragging_scroll(&self) -> bool {
        self.scroll_drag.is_some() || self.resize_drag.is_some()
    }

    /// Drops state whose node vanished in the latest refresh.
    pub fn sync(&mut self, frame: &Frame) {
        if let Some(edit) = &self.edit {
            if frame.tree.find(edit.hash).is_none() {
                debug!(hash = edit.hash, "edit target vanished");
                self.edit = None;
            }
        }
        if let Some(press) = self.press {
            if frame.tree.find(press.hash).is_none() {
                self.press = None;
                self.drag = None;
            }
        }
    }

    /// Applies the commands that target interaction state. Returns true when
    /// the command was consumed here.
    pub fn command(&mut self, cmd: &LayoutCmd, frame: &Frame) -> bool {
        match cmd {
            LayoutCmd::ActivateEditbox(hash) => {
                if let Some((_, node)) = frame.tree.find(*hash) {
                    if node.caps.edit {
                        self.edit = Some(begin_edit(node, frame));
                    }
                }
                true
            }
            LayoutCmd::Copy | LayoutCmd::Cut | LayoutCmd::Paste | LayoutCmd::SelectAll | LayoutCmd::Record => {
                if let Some(edit) = self.edit.as_mut() {
                    let p = &mut edit.pending;
                    match cmd {
                        LayoutCmd::Copy => p.copy = true,
                        LayoutCmd::Cut => p.cut = true,
                        LayoutCmd::Paste => p.paste = true,
                        LayoutCmd::SelectAll => p.select_all = true,
                        _ => p.record = true,
                    }
                }
                true
            }
            LayoutCmd::SetClipboard(text) => {
                self.clipboard = text.clone();
                true
            }
            _ => false,
        }
    }

    /// Processes one frame of raw input.
    pub fn tick(&mut self, raw: &RawInput, frame: &Frame, settings: &mut Settings, env: &mut Environment) -> TickOutput {
        let mut out = TickOutput::default();
        let dt = (raw.time - self.prev_time).max(0.0);
        if let Some(edit) = self.edit.as_mut() {
            edit.tick(dt);
        }

        self.keys(raw, frame, settings, env, &mut out);
        self.wheel(raw, frame, settings, env, &mut out);

        let left_pressed = raw.left_down && !self.prev_left;
        let right_pressed = raw.right_down && !self.prev_right;
        let released = (self.prev_left && !raw.left_down) || (self.prev_right && !raw.right_down);

        if left_pressed || right_pressed {
            self.pointer_down(raw, right_pressed && !left_pressed, frame, settings, &mut out);
        } else if raw.any_down() {
            self.pointer_held(raw, frame, settings, &mut out);
        }
        if released {
            self.pointer_up(raw, frame, &mut out);
        }

        self.dropped_files(raw, frame, &mut out);
        self.hover(raw, frame, &mut out);

        self.prev_left = raw.left_down;
        self.prev_right = raw.right_down;
        self.prev_pointer = raw.pointer;
        self.prev_time = raw.time;
        out
    }

    fn keys(&mut self, raw: &RawInput, frame: &Frame, settings: &mut Settings, env: &mut Environment, out: &mut TickOutput) {
        for &key in &raw.keys {
            if key == Key::Escape && raw.mods.shift {
                self.blur(out);
                if !settings.dialogs.is_empty() {
                    settings.close_all_dialogs();
                    out.needs_refresh = true;
                }
                continue;
            }

            if let Some(edit) = self.edit.as_mut() {
                match edit.key(key, raw.mods) {
                    EditEvent::None | EditEvent::Changed => {}
                    EditEvent::Commit => {
                        let value = edit.text.clone();
                        out.events.push(set_edit_event(edit.hash, value, true, raw.mods));
                        self.edit = None;
                    }
                    EditEvent::Cancel => {
                        let value = edit.text.clone();
                        out.events.push(set_edit_event(edit.hash, value, false, raw.mods));
                        self.edit = None;
                    }
                }
                continue;
            }

            match key {
                Key::Escape => {
                    if settings.close_dialog(NO_HASH) {
                        out.needs_refresh = true;
                    }
                }
                Key::Char('+') | Key::Char('=') if raw.mods.ctrl => {
                    out.env_changed |= env.zoom(1);
                }
                Key::Char('-') if raw.mods.ctrl => {
                    out.env_changed |= env.zoom(-1);
                }
                Key::Char(c) if raw.mods.ctrl => self.shortcut(c.to_ascii_lowercase(), raw.mods, frame, out),
                Key::Tab if raw.mods.ctrl => self.shortcut('\t', raw.mods, frame, out),
                _ => {}
            }
        }

        if let Some(edit) = self.edit.as_mut() {
            if edit.pending.any() {
                edit.apply_pending(&mut self.clipboard);
            }
        }
    }

    fn shortcut(&mut self, key: char, mods: Modifiers, frame: &Frame, out: &mut TickOutput) {
        let Some(level) = frame.tree.top() else {
            return;
        };
        out.events.push(NodeEvent {
            hash: level.hash,
            input: LayoutInput {
                shortcut_key: Some(key),
                mods,
                is_up: true,
                ..Default::default()
            },
        });
    }

    fn wheel(&mut self, raw: &RawInput, frame: &Frame, settings: &mut Settings, env: &mut Environment, out: &mut TickOutput) {
        let (wx, wy) = raw.wheel;
        if wx == 0.0 && wy == 0.0 {
            return;
        }
        if raw.mods.ctrl {
            let steps = wy.signum() as i32;
            out.env_changed |= env.zoom(steps);
            return;
        }
        let (axis, delta) = if raw.mods.shift || (wy == 0.0 && wx != 0.0) {
            (Axis::X, if wy != 0.0 { wy } else { wx })
        } else {
            (Axis::Y, wy)
        };
        let Some(level) = frame.tree.top() else {
            return;
        };
        let Some(hit) = level.hit(raw.pointer) else {
            return;
        };
        let target = level
            .ancestors(hit)
            .map(|i| &level.nodes[i])
            .find(|n| n.scroll(axis).is_active());
        if let Some(node) = target {
            let mut scroll = *node.scroll(axis);
            if scroll.scroll_by(-delta.round() as i32) {
                settings.set_scroll(node.hash, axis, scroll.wheel);
                out.needs_refresh = true;
            }
        }
    }

    fn pointer_down(&mut self, raw: &RawInput, right: bool, frame: &Frame, settings: &mut Settings, out: &mut TickOutput) {
        let p = raw.pointer;
        let Some(level) = frame.tree.top() else {
            return;
        };

        if let Some(entry) = &level.dialog {
            if !level.rect.contains(p) {
                debug!(hash = entry.hash, "press outside dialog closes it");
                self.blur(out);
                settings.close_dialog(entry.hash);
                out.needs_refresh = true;
                return;
            }
        }

        let cell = frame.tree.cell;
        let thickness = frame.tree.scroll_thickness();
        if !right {
            if let Some(drag) = scroll_bar_at(level, p, thickness) {
                self.scroll_drag = Some(drag);
                self.pointer_held(raw, frame, settings, out);
                return;
            }
            if let Some(drag) = resizer_at(level, p, cell) {
                self.resize_drag = Some(drag);
                return;
            }
        }

        let Some(target) = press_target(level, p) else {
            self.blur(out);
            return;
        };
        let node = &level.nodes[target];

        if self.edit.as_ref().is_some_and(|e| e.hash != node.hash) {
            self.blur(out);
        }

        let clicks = match self.last_click {
            Some((hash, t, n)) if hash == node.hash && raw.time - t <= DOUBLE_CLICK_SECS => n.saturating_add(1),
            _ => 1,
        };
        self.last_click = Some((node.hash, raw.time, clicks));
        self.press = Some(Press {
            hash: node.hash,
            right,
            clicks,
        });

        if node.caps.edit && !right && self.edit.is_none() {
            self.edit = Some(begin_edit(node, frame));
        }
        if let Some(edit) = self.edit.as_mut().filter(|e| e.hash == node.hash) {
            edit.click = Some(((p.x - node.canvas.start.x) as f32, raw.mods.shift));
            if clicks >= 2 {
                edit.click = None;
                let pos = edit.cursor_pos.min(edit.text.chars().count().saturating_sub(1));
                edit.select_word_at(pos);
            }
        }

        if !right {
            self.drag = level
                .ancestors(target)
                .map(|i| &level.nodes[i])
                .find_map(|n| n.props.drag.clone().map(|s| (n.hash, s)))
                .map(|(hash, source)| DragState { hash, source, over: None });
        }

        if node.caps.input {
            let mut input = local_input(node, p, cell, thickness, raw);
            input.is_start = true;
            input.is_active = true;
            input.num_clicks = clicks;
            input.right_button = right;
            out.events.push(NodeEvent { hash: node.hash, input });
        }
    }

    fn pointer_held(&mut self, raw: &RawInput, frame: &Frame, settings: &mut Settings, out: &mut TickOutput) {
        let p = raw.pointer;
        let cell = frame.tree.cell;

        if let Some(drag) = self.scroll_drag {
            let along = match drag.axis {
                Axis::X => p.x,
                Axis::Y => p.y,
            };
            let wheel = drag.scroll.wheel_for_thumb(along - drag.bar_start - drag.grab, drag.track);
            if wheel != settings.scroll(drag.hash, drag.axis) {
                settings.set_scroll(drag.hash, drag.axis, wheel);
                out.needs_refresh = true;
            }
            return;
        }

        if let Some(drag) = self.resize_drag {
            let along = match drag.axis {
                Axis::X => p.x,
                Axis::Y => p.y,
            };
            let size = (drag.start_cells + (along - drag.origin) as f32 / cell.max(1) as f32).max(drag.min_cells);
            let size = (size * 100.0).round() / 100.0;
            if settings.resize(drag.hash, drag.axis, drag.pos) != Some(size) {
                settings.set_resize(drag.hash, drag.axis, drag.pos, size);
                out.needs_refresh = true;
            }
            return;
        }

        let Some(press) = self.press else {
            return;
        };

        if let Some(drag) = self.drag.as_mut() {
            let over = frame.tree.top().and_then(|level| drop_candidate(level, p, drag));
            drag.over = over;
        }

        if p == self.prev_pointer {
            return;
        }
        if let Some((_, node)) = frame.tree.find(press.hash) {
            if node.caps.input {
                let mut input = local_input(node, p, cell, frame.tree.scroll_thickness(), raw);
                input.is_active = true;
                input.num_clicks = press.clicks;
                input.right_button = press.right;
                out.events.push(NodeEvent { hash: press.hash, input });
            }
        }
    }

    fn pointer_up(&mut self, raw: &RawInput, frame: &Frame, out: &mut TickOutput) {
        let p = raw.pointer;
        self.scroll_drag = None;
        self.resize_drag = None;
        let drag = self.drag.take();
        let Some(press) = self.press.take() else {
            return;
        };
        let cell = frame.tree.cell;
        let thickness = frame.tree.scroll_thickness();

        if let Some((_, node)) = frame.tree.find(press.hash) {
            if node.caps.input {
                let mut input = local_input(node, p, cell, thickness, raw);
                input.is_end = true;
                input.num_clicks = press.clicks;
                input.right_button = press.right;
                out.events.push(NodeEvent { hash: press.hash, input });
            }
        }

        if let Some((dst, mv)) = drag.and_then(|d| d.over) {
            if let Some((_, node)) = frame.tree.find(dst) {
                debug!(src = mv.src_i, dst = mv.dst_i, pos = ?mv.pos, "drop");
                let mut input = local_input(node, p, cell, thickness, raw);
                input.is_end = true;
                input.drop_move = Some(mv);
                out.events.push(NodeEvent { hash: dst, input });
            }
        }
    }

    fn dropped_files(&mut self, raw: &RawInput, frame: &Frame, out: &mut TickOutput) {
        if raw.dropped_files.is_empty() {
            return;
        }
        let Some(level) = frame.tree.top() else {
            return;
        };
        let Some(hit) = level.hit(raw.pointer) else {
            return;
        };
        let Some(node) = level
            .ancestors(hit)
            .map(|i| &level.nodes[i])
            .find(|n| n.caps.drop_file)
        else {
            debug!(files = raw.dropped_files.len(), "no node accepts dropped files");
            return;
        };
        for path in &raw.dropped_files {
            let mut input = local_input(node, raw.pointer, frame.tree.cell, frame.tree.scroll_thickness(), raw);
            input.drop_file = Some(path.clone());
            out.events.push(NodeEvent { hash: node.hash, input });
        }
    }

    fn hover(&mut self, raw: &RawInput, frame: &Frame, out: &mut TickOutput) {
        let p = raw.pointer;
        let Some(level) = frame.tree.top() else {
            self.hover = None;
            return;
        };
        let cell = frame.tree.cell;
        let hit = level.hit(p);
        let hovered = hit.map(|i| level.nodes[i].hash);
        if hovered != self.hover {
            self.hover = hovered;
            self.hover_since = raw.time;
        }

        out.cursor = if let Some(drag) = self.resize_drag {
            resize_cursor(drag.axis)
        } else if self.drag.as_ref().is_some_and(|d| d.over.is_some()) {
            CursorIcon::Move
        } else if let Some(drag) = resizer_at(level, p, cell) {
            resize_cursor(drag.axis)
        } else {
            hit.and_then(|i| cursor_at(level, i, frame, p)).unwrap_or_default()
        };

        let Some(hit) = hit else {
            return;
        };
        let waited = raw.time - self.hover_since >= TOOLTIP_DELAY_SECS;
        out.tooltip = tooltip_at(level, hit, frame, p, waited && !raw.any_down());
    }

    /// Leaves edit without committing.
    fn blur(&mut self, out: &mut TickOutput) {
        if let Some(edit) = self.edit.take() {
            out.events.push(set_edit_event(edit.hash, edit.text, false, Modifiers::default()));
        }
    }
}

fn set_edit_event(hash: NodeHash, value: String, commit: bool, mods: Modifiers) -> NodeEvent {
    NodeEvent {
        hash,
        input: LayoutInput {
            set_edit: Some(SetEdit { value, commit }),
            mods,
            is_up: true,
            ..Default::default()
        },
    }
}

fn begin_edit(node: &ResolvedNode, frame: &Frame) -> EditState {
    let multiline = frame
        .buffer(node.hash)
        .iter()
        .any(|p| matches!(p, DrawPrim::Text(t) if t.flags.editable && t.flags.multiline));
    EditState::begin(node.hash, node.edit_value.as_deref().unwrap_or_default(), multiline)
}

/// `LayoutInput` for `node` with the pointer at `p`, in the node's cells.
fn local_input(node: &ResolvedNode, p: Vec2i, cell: i32, thickness: i32, raw: &RawInput) -> LayoutInput {
    let c = cell.max(1) as f32;
    let over_scroll = node.v_bar(thickness).is_some_and(|b| b.contains(p)) || node.h_bar(thickness).is_some_and(|b| b.contains(p));
    LayoutInput {
        rect: CellRect::sized(node.canvas.size.x as f32 / c, node.canvas.size.y as f32 / c),
        x: (p.x - node.canvas.start.x) as f32 / c,
        y: (p.y - node.canvas.start.y) as f32 / c,
        is_inside: node.crop.contains(p),
        is_up: !raw.any_down(),
        is_over_scroll: over_scroll,
        mods: raw.mods,
        ..Default::default()
    }
}

/// Every node from `idx` to the level root can be touched.
fn touchable(level: &Level, idx: usize) -> bool {
    level.ancestors(idx).all(|i| level.nodes[i].props.can_touch())
}

/// Deepest node under `p` that reacts to presses or can be dragged.
fn press_target(level: &Level, p: Vec2i) -> Option<usize> {
    let hit = level.hit(p)?;
    if !touchable(level, hit) {
        return None;
    }
    level.ancestors(hit).find(|&i| {
        let n = &level.nodes[i];
        n.caps.wants_press() || n.props.drag.is_some()
    })
}

fn scroll_bar_at(level: &Level, p: Vec2i, thickness: i32) -> Option<ScrollDrag> {
    for (idx, node) in level.nodes.iter().enumerate().rev() {
        let parent_crop = node.parent.map(|i| level.nodes[i].crop).unwrap_or(level.rect);
        for axis in [Axis::Y, Axis::X] {
            let bar = match axis {
                Axis::Y => node.v_bar(thickness),
                Axis::X => node.h_bar(thickness),
            };
            let Some(bar) = bar else {
                continue;
            };
            if !bar.intersect(&parent_crop).contains(p) || !touchable(level, idx) {
                continue;
            }
            let scroll = *node.scroll(axis);
            let (bar_start, track, along) = match axis {
                Axis::Y => (bar.start.y, bar.size.y, p.y),
                Axis::X => (bar.start.x, bar.size.x, p.x),
            };
            let (offset, len) = scroll.thumb(track);
            let on_thumb = along >= bar_start + offset && along < bar_start + offset + len;
            let grab = if on_thumb { along - bar_start - offset } else { len / 2 };
            return Some(ScrollDrag {
                hash: node.hash,
                axis,
                bar_start,
                track,
                grab,
                scroll,
            });
        }
    }
    None
}

fn resizer_at(level: &Level, p: Vec2i, cell: i32) -> Option<ResizeDrag> {
    for (idx, node) in level.nodes.iter().enumerate().rev() {
        if node.crop.is_empty() {
            continue;
        }
        let grab = node.crop.inset(-RESIZER_WIDTH);
        if !grab.contains(p) || !touchable(level, idx) {
            continue;
        }
        for axis in [Axis::X, Axis::Y] {
            let along = match axis {
                Axis::X => p.x,
                Axis::Y => p.y,
            };
            for track in node.tracks(axis).iter().filter(|t| t.is_resizable()) {
                if track.pos >= node.resolved(axis).len() {
                    continue;
                }
                let boundary = node.boundary(axis, track.pos);
                if (boundary..boundary + RESIZER_WIDTH).contains(&along) {
                    let px = node.resolved(axis)[track.pos];
                    return Some(ResizeDrag {
                        hash: node.hash,
                        axis,
                        pos: track.pos,
                        origin: along,
                        start_cells: px as f32 / cell.max(1) as f32,
                        min_cells: track.min.max(MIN_RESIZE),
                    });
                }
            }
        }
    }
    None
}

fn drop_candidate(level: &Level, p: Vec2i, drag: &DragState) -> Option<(NodeHash, DropMove)> {
    let hit = level.hit(p)?;
    level.ancestors(hit).find_map(|i| {
        let node = &level.nodes[i];
        let target = node.props.drop.as_ref()?;
        if target.group != drag.source.group || (node.hash == drag.hash && target.dirs.inside) {
            return None;
        }
        let pos = DropPos::compute(&node.rect, p, target.dirs)?;
        Some((
            node.hash,
            DropMove {
                src_i: drag.source.index,
                dst_i: target.index,
                src_source: drag.source.source.clone(),
                dst_source: target.source.clone(),
                pos,
            },
        ))
    })
}

fn resize_cursor(axis: Axis) -> CursorIcon {
    match axis {
        Axis::X => CursorIcon::ResizeH,
        Axis::Y => CursorIcon::ResizeV,
    }
}

/// Cursor primitive under `p` in the hovered node or its ancestors.
fn cursor_at(level: &Level, hit: usize, frame: &Frame, p: Vec2i) -> Option<CursorIcon> {
    let cell = frame.tree.cell;
    for i in level.ancestors(hit) {
        let node = &level.nodes[i];
        for prim in frame.buffer(node.hash).iter().rev() {
            if let DrawPrim::Cursor { rect, cursor } = prim {
                if rect.to_px(node.canvas.start, cell).contains(p) {
                    return Some(*cursor);
                }
            }
        }
        if node.caps.edit {
            return Some(CursorIcon::Text);
        }
    }
    None
}

/// Tooltip under `p`. Forced tooltips show right away, others once the
/// hover has lasted long enough.
fn tooltip_at(level: &Level, hit: usize, frame: &Frame, p: Vec2i, waited: bool) -> Option<TooltipOut> {
    let cell = frame.tree.cell;
    for i in level.ancestors(hit) {
        let node = &level.nodes[i];
        for prim in frame.buffer(node.hash).iter().rev() {
            if let DrawPrim::Tooltip { rect, description, force } = prim {
                let anchor = rect.to_px(node.canvas.start, cell);
                if anchor.contains(p) && (*force || waited) && !description.is_empty() {
                    return Some(TooltipOut {
                        text: description.clone(),
                        anchor,
                    });
                }
            }
        }
        if waited && !node.props.tooltip.is_empty() {
            return Some(TooltipOut {
                text: node.props.tooltip.clone(),
                anchor: node.crop,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{NodeKey, ROOT_HASH};
    use crate::input::DropDirs;
    use crate::node::{Caps, LayoutNode};
    use crate::protocol::Buffers;
    use crate::render_commands::Paint;
    use crate::resolve::Resolver;
    use crate::settings::DialogEntry;
    use crate::text::MonoMeasure;

    fn child(hash: NodeHash, name: &str, x: i32, y: i32) -> LayoutNode {
        LayoutNode::new(hash, ROOT_HASH, NodeKey::new(name, x, y, 1, 1))
    }

    fn frame_of(root: &LayoutNode, dialogs: &[(LayoutNode, DialogEntry)], settings: &mut Settings, buffers: Buffers) -> Frame {
        let measure = MonoMeasure::default();
        let mut r = Resolver::new(settings, &measure, 40, Vec2i::new(400, 400));
        r.resolve_root(root);
        for (d, e) in dialogs {
            r.resolve_dialog(d, e);
        }
        Frame::new(r.finish(), buffers)
    }

    fn button_root() -> LayoutNode {
        let mut root = LayoutNode::new(ROOT_HASH, NO_HASH, NodeKey::new("root", 0, 0, 1, 1));
        root.cols.set(0, 2.0, 2.0);
        let mut button = child(10, "Button", 0, 0);
        button.caps = Caps {
            input: true,
            ..Default::default()
        };
        root.children.push(button);
        root
    }

    fn at(time: f64, x: i32, y: i32, down: bool) -> RawInput {
        RawInput {
            time,
            window: Vec2i::new(400, 400),
            pointer: Vec2i::new(x, y),
            left_down: down,
            ..Default::default()
        }
    }

    #[test]
    fn click_emits_start_and_end() {
        let mut settings = Settings::default();
        let frame = frame_of(&button_root(), &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        let out = ia.tick(&at(0.0, 10, 10, true), &frame, &mut settings, &mut env);
        assert_eq!(out.events.len(), 1);
        assert!(out.events[0].input.is_start);
        assert_eq!(ia.pressed(), Some(10));

        let out = ia.tick(&at(0.1, 12, 10, false), &frame, &mut settings, &mut env);
        let end = &out.events[0].input;
        assert!(end.is_end && end.is_clicked(1, false));
        assert_eq!(end.x, 0.3);
        assert_eq!(ia.pressed(), None);
    }

    #[test]
    fn quick_second_press_is_a_double_click() {
        let mut settings = Settings::default();
        let frame = frame_of(&button_root(), &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();
        ia.tick(&at(0.0, 10, 10, true), &frame, &mut settings, &mut env);
        ia.tick(&at(0.1, 10, 10, false), &frame, &mut settings, &mut env);
        let out = ia.tick(&at(0.3, 10, 10, true), &frame, &mut settings, &mut env);
        assert_eq!(out.events[0].input.num_clicks, 2);
        ia.tick(&at(0.35, 10, 10, false), &frame, &mut settings, &mut env);
        let out = ia.tick(&at(2.0, 10, 10, true), &frame, &mut settings, &mut env);
        assert_eq!(out.events[0].input.num_clicks, 1);
    }

    #[test]
    fn press_outside_dialog_closes_it() {
        let mut settings = Settings::default();
        settings.open_dialog(60, NO_HASH, None);
        let mut dialog = LayoutNode::new(60, ROOT_HASH, NodeKey::dialog("d"));
        dialog.cols.set(0, 2.0, 2.0);
        dialog.rows.set(0, 2.0, 2.0);
        let entry = settings.dialogs[0].clone();
        let frame = frame_of(&button_root(), &[(dialog, entry)], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        let out = ia.tick(&at(0.0, 10, 10, true), &frame, &mut settings, &mut env);
        assert!(out.events.is_empty());
        assert!(out.needs_refresh);
        assert!(settings.dialogs.is_empty());
    }

    #[test]
    fn escape_closes_top_dialog_and_shift_escape_all() {
        let mut settings = Settings::default();
        settings.open_dialog(60, NO_HASH, None);
        settings.open_dialog(61, NO_HASH, None);
        settings.open_dialog(62, NO_HASH, None);
        let frame = frame_of(&button_root(), &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        let mut raw = at(0.0, 0, 0, false);
        raw.keys = vec![Key::Escape];
        assert!(ia.tick(&raw, &frame, &mut settings, &mut env).needs_refresh);
        assert_eq!(settings.dialogs.len(), 2);

        raw.mods.shift = true;
        ia.tick(&raw, &frame, &mut settings, &mut env);
        assert!(settings.dialogs.is_empty());
    }

    #[test]
    fn wheel_scrolls_the_nearest_scrollable_ancestor() {
        let mut root = LayoutNode::new(ROOT_HASH, NO_HASH, NodeKey::new("root", 0, 0, 1, 1));
        root.cols.set(0, 1.0, 100.0);
        for i in 0..50 {
            root.children.push(child(100 + i as u64, "Row", 0, i));
        }
        let mut settings = Settings::default();
        let frame = frame_of(&root, &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        let mut raw = at(0.0, 50, 50, false);
        raw.wheel = (0.0, -120.0);
        let out = ia.tick(&raw, &frame, &mut settings, &mut env);
        assert!(out.needs_refresh);
        assert_eq!(settings.scroll(ROOT_HASH, Axis::Y), 120);

        raw.wheel = (0.0, 1.0);
        raw.mods.ctrl = true;
        let out = ia.tick(&raw, &frame, &mut settings, &mut env);
        assert!(out.env_changed);
        assert_eq!(env.dpi, 110);
    }

    #[test]
    fn thumb_drag_moves_the_wheel() {
        let mut root = LayoutNode::new(ROOT_HASH, NO_HASH, NodeKey::new("root", 0, 0, 1, 1));
        root.cols.set(0, 1.0, 100.0);
        for i in 0..50 {
            root.children.push(child(100 + i as u64, "Row", 0, i));
        }
        let mut settings = Settings::default();
        let frame = frame_of(&root, &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        // bar at x 387..400, thumb 80 px long at the top
        ia.tick(&at(0.0, 393, 10, true), &frame, &mut settings, &mut env);
        assert!(ia.is_dragging_scroll());
        ia.tick(&at(0.1, 393, 170, true), &frame, &mut settings, &mut env);
        assert_eq!(settings.scroll(ROOT_HASH, Axis::Y), 800);
        let out = ia.tick(&at(0.2, 393, 170, false), &frame, &mut settings, &mut env);
        assert!(out.events.is_empty());
        assert!(!ia.is_dragging_scroll());
    }

    #[test]
    fn resizer_drag_persists_the_size() {
        let mut root = LayoutNode::new(ROOT_HASH, NO_HASH, NodeKey::new("root", 0, 0, 1, 1));
        root.cols.set_resizable(0, 1.0, 10.0, 3.0);
        root.cols.set(1, 1.0, 1.0);
        root.children.push(child(10, "A", 0, 0));
        let mut settings = Settings::default();
        let frame = frame_of(&root, &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        for x in [119, 121] {
            let out = ia.tick(&at(0.0, x, 10, false), &frame, &mut settings, &mut env);
            assert_ne!(out.cursor, CursorIcon::ResizeH, "x = {x}");
        }
        let out = ia.tick(&at(0.0, 120, 10, false), &frame, &mut settings, &mut env);
        assert_eq!(out.cursor, CursorIcon::ResizeH);
        ia.tick(&at(0.1, 120, 10, true), &frame, &mut settings, &mut env);
        ia.tick(&at(0.2, 200, 10, true), &frame, &mut settings, &mut env);
        ia.tick(&at(0.3, 200, 10, false), &frame, &mut settings, &mut env);
        assert_eq!(settings.resize(ROOT_HASH, Axis::X, 0), Some(5.0));
    }

    fn list_root(items: usize) -> LayoutNode {
        let mut root = LayoutNode::new(ROOT_HASH, NO_HASH, NodeKey::new("root", 0, 0, 1, 1));
        root.cols.set(0, 5.0, 5.0);
        for i in 0..items {
            let mut item = child(100 + i as u64, "Item", 0, i as i32);
            item.props.drag("items", "live", i).drop("items", "live", i, DropDirs::VERTICAL);
            item.caps.drop_move = true;
            root.children.push(item);
        }
        root
    }

    #[test]
    fn drag_and_drop_reports_the_destination() {
        let mut settings = Settings::default();
        let frame = frame_of(&list_root(8), &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        ia.tick(&at(0.0, 20, 2 * 40 + 20, true), &frame, &mut settings, &mut env);
        ia.tick(&at(0.1, 20, 5 * 40 + 5, true), &frame, &mut settings, &mut env);
        assert_eq!(ia.drop_target(), Some((105, DropPos::VerticalBefore)));
        let out = ia.tick(&at(0.2, 20, 5 * 40 + 5, false), &frame, &mut settings, &mut env);

        let drop = out.events.iter().find(|e| e.input.drop_move.is_some()).unwrap();
        assert_eq!(drop.hash, 105);
        let mv = drop.input.drop_move.as_ref().unwrap();
        assert_eq!((mv.src_i, mv.dst_i), (2, 5));
        assert_eq!(mv.target_index(), 4);
        assert!(drop.input.is_end);
    }

    #[test]
    fn drop_side_splits_the_full_item_rect() {
        let mut settings = Settings::default();
        settings.set_scroll(ROOT_HASH, Axis::Y, 20);
        let frame = frame_of(&list_root(20), &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        // item 0 spans y -20..20 but only 0..20 is visible
        ia.tick(&at(0.0, 20, 200, true), &frame, &mut settings, &mut env);
        ia.tick(&at(0.1, 20, 5, true), &frame, &mut settings, &mut env);
        assert_eq!(ia.drop_target(), Some((100, DropPos::VerticalAfter)));
    }

    fn editbox_frame(settings: &mut Settings) -> Frame {
        let mut root = LayoutNode::new(ROOT_HASH, NO_HASH, NodeKey::new("root", 0, 0, 1, 1));
        root.cols.set(0, 5.0, 5.0);
        let mut edit = child(10, "Editbox", 0, 0);
        edit.caps.edit = true;
        edit.edit_value = Some("abc".into());
        root.children.push(edit);
        let mut paint = Paint::new();
        paint.tooltip(CellRect::sized(5.0, 1.0), "type here", false);
        let mut buffers = Buffers::new();
        buffers.insert(10, paint.into_prims());
        frame_of(&root, &[], settings, buffers)
    }

    #[test]
    fn editbox_commit_sends_one_set_edit() {
        let mut settings = Settings::default();
        let frame = editbox_frame(&mut settings);
        let mut env = Environment::default();
        let mut ia = Interaction::new();

        ia.tick(&at(0.0, 10, 10, true), &frame, &mut settings, &mut env);
        ia.tick(&at(0.1, 10, 10, false), &frame, &mut settings, &mut env);
        assert_eq!(ia.edit().map(|e| e.text.as_str()), Some("abc"));

        let mut raw = at(0.2, 10, 10, false);
        raw.keys = vec![Key::Char('d'), Key::Enter];
        let out = ia.tick(&raw, &frame, &mut settings, &mut env);
        let edits: Vec<_> = out.events.iter().filter_map(|e| e.input.set_edit.as_ref()).collect();
        assert_eq!(
            edits,
            vec![&SetEdit {
                value: "abcd".into(),
                commit: true
            }]
        );
        assert!(ia.edit().is_none());
    }

    #[test]
    fn pressing_elsewhere_blurs_without_commit() {
        let mut settings = Settings::default();
        let frame = editbox_frame(&mut settings);
        let mut env = Environment::default();
        let mut ia = Interaction::new();
        ia.command(&LayoutCmd::ActivateEditbox(10), &frame);
        assert!(ia.edit().is_some());

        let out = ia.tick(&at(0.0, 10, 300, true), &frame, &mut settings, &mut env);
        assert_eq!(out.events[0].input.set_edit.as_ref().map(|s| s.commit), Some(false));
        assert!(ia.edit().is_none());
    }

    #[test]
    fn tooltip_waits_for_the_hover_delay() {
        let mut settings = Settings::default();
        let frame = editbox_frame(&mut settings);
        let mut env = Environment::default();
        let mut ia = Interaction::new();
        let out = ia.tick(&at(1.0, 10, 10, false), &frame, &mut settings, &mut env);
        assert!(out.tooltip.is_none());
        assert_eq!(out.cursor, CursorIcon::Text);
        let out = ia.tick(&at(1.6, 10, 10, false), &frame, &mut settings, &mut env);
        assert_eq!(out.tooltip.map(|t| t.text), Some("type here".to_string()));
    }

    #[test]
    fn ctrl_char_becomes_a_shortcut_on_the_top_level() {
        let mut settings = Settings::default();
        let frame = frame_of(&button_root(), &[], &mut settings, Buffers::new());
        let mut env = Environment::default();
        let mut ia = Interaction::new();
        let mut raw = at(0.0, 0, 0, false);
        raw.mods.ctrl = true;
        raw.keys = vec![Key::Char('S')];
        let out = ia.tick(&raw, &frame, &mut settings, &mut env);
        assert_eq!(out.events[0].hash, ROOT_HASH);
        assert_eq!(out.events[0].input.shortcut_key, Some('s'));
    }
}
