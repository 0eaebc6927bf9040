use macroquad::prelude::*;
use macroquad::miniquad::window as mq_window;
use macroquad::miniquad::CursorIcon as MqCursor;

use crate::diff::{Frame, FrameDiff};
use crate::env::{Environment, Palette};
use crate::input::{DropPos, Key, Modifiers, RawInput};
use crate::interaction::{Interaction, TooltipOut};
use crate::math::{RectPx, Vec2i};
use crate::render_commands::{CursorIcon, DrawPrim, TextPrim};
use crate::resolve::{Level, ResolvedNode};
use crate::text::{wrap_lines, LineCache, TextMeasure, VisualLine};
use crate::text_input::{compute_char_x_positions, cursor_to_visual_pos, display_text, EditState};

use std::collections::HashMap;

const PIXELS_PER_POINT: f32 = 2.0;
/// Glyph size relative to the line height.
const FONT_SCALE: f32 = 0.6;
/// Cells scrolled per wheel notch.
const WHEEL_CELLS: f32 = 3.0;
const MODAL_DIM: Color = Color::new(0.0, 0.0, 0.0, 0.35);

fn ply_to_macroquad_color(color: crate::color::Color) -> Color {
    Color::from_rgba(color.r, color.g, color.b, color.a)
}

fn draw_good_circle(x: f32, y: f32, r: f32, color: Color) {
    let sides = ((2.0 * std::f32::consts::PI * r) / PIXELS_PER_POINT).max(20.0);
    draw_poly(x, y, sides.min(255.0) as u8, r, 0.0, color);
}

fn draw_rounded_rectangle(x: f32, y: f32, w: f32, h: f32, r: f32, color: Color) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    if r < 0.5 {
        draw_rectangle(x, y, w, h, color);
        return;
    }
    draw_rectangle(x + r, y, w - 2.0 * r, h, color);
    draw_rectangle(x, y + r, r, h - 2.0 * r, color);
    draw_rectangle(x + w - r, y + r, r, h - 2.0 * r, color);
    draw_good_circle(x + r, y + r, r, color);
    draw_good_circle(x + w - r, y + r, r, color);
    draw_good_circle(x + r, y + h - r, r, color);
    draw_good_circle(x + w - r, y + h - r, r, color);
}

fn font_size(line_px: f32) -> u16 {
    (line_px * FONT_SCALE).round().max(1.0) as u16
}

fn set_clip(rect: Option<RectPx>) {
    let clip = rect.map(|r| (r.start.x, r.start.y, r.size.x.max(0), r.size.y.max(0)));
    unsafe {
        get_internal_gl().quad_gl.scissor(clip);
    }
}

/// Text measurement with macroquad's font rasterizer.
pub struct MacroquadMeasure {
    font: Option<Font>,
}

impl MacroquadMeasure {
    pub fn new(font: Option<Font>) -> Self {
        Self { font }
    }

    pub fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }
}

impl TextMeasure for MacroquadMeasure {
    fn width(&self, text: &str, line_px: f32) -> f32 {
        measure_text(text, self.font.as_ref(), font_size(line_px), 1.0).width
    }
}

/// Caches textures loaded for `File` primitives, unloading those unused for
/// more than `max_frames_not_used` frames.
pub struct TextureManager {
    textures: HashMap<String, TextureData>,
    failed: HashMap<String, usize>,
    pub max_frames_not_used: usize,
}

struct TextureData {
    frames_not_used: usize,
    texture: Texture2D,
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureManager {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            failed: HashMap::new(),
            max_frames_not_used: 60,
        }
    }

    /// Returns the cached texture for `path`, loading it on first use. Paths
    /// that fail to load are not retried while they keep being requested.
    pub async fn get_or_load(&mut self, path: &str) -> Option<&Texture2D> {
        if !self.textures.contains_key(path) {
            if let Some(frames) = self.failed.get_mut(path) {
                *frames = 0;
                return None;
            }
            match load_texture(path).await {
                Ok(texture) => {
                    self.textures.insert(path.to_owned(), TextureData { frames_not_used: 0, texture });
                }
                Err(error) => {
                    warn!("Failed to load image: {}. Error: {}", path, error);
                    self.failed.insert(path.to_owned(), 0);
                    return None;
                }
            }
        }
        let entry = self.textures.get_mut(path)?;
        entry.frames_not_used = 0;
        Some(&entry.texture)
    }

    pub fn clean(&mut self) {
        let max = self.max_frames_not_used;
        self.textures.retain(|_, data| data.frames_not_used <= max);
        self.failed.retain(|_, frames| *frames <= max);
        for data in self.textures.values_mut() {
            data.frames_not_used += 1;
        }
        for frames in self.failed.values_mut() {
            *frames += 1;
        }
    }

    pub fn size(&self) -> usize {
        self.textures.len()
    }
}

/// Pointer state of the node being drawn.
#[derive(Clone, Copy)]
struct NodeState {
    hovered: bool,
    pressed: bool,
}

/// Draws frames with macroquad and feeds it input.
pub struct Renderer {
    measure: MacroquadMeasure,
    textures: TextureManager,
    lines: LineCache,
    clipboard: String,
    prev_ctrl_v: bool,
}

impl Renderer {
    pub fn new(font: Option<Font>) -> Self {
        Self {
            measure: MacroquadMeasure::new(font),
            textures: TextureManager::new(),
            lines: LineCache::new(),
            clipboard: String::new(),
            prev_ctrl_v: false,
        }
    }

    pub fn measure(&self) -> &MacroquadMeasure {
        &self.measure
    }

    /// Forgets cached text layout of every node the host reports as moved,
    /// repainted or gone.
    pub fn invalidate(&mut self, damage: &FrameDiff) {
        if damage.is_empty() {
            return;
        }
        let dropped = self.lines.invalidate(damage);
        tracing::trace!(
            relayout = damage.relayout.len(),
            repaint = damage.repaint.len(),
            removed = damage.removed.len(),
            dropped,
            "frame damage"
        );
    }

    /// Collects this frame's window input. A Ctrl+V pulls the system
    /// clipboard into `interaction` first so the paste sees it.
    pub fn poll_input(&mut self, interaction: &mut Interaction, cell: i32) -> RawInput {
        let mods = Modifiers {
            shift: is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift),
            ctrl: is_key_down(KeyCode::LeftControl)
                || is_key_down(KeyCode::RightControl)
                || is_key_down(KeyCode::LeftSuper)
                || is_key_down(KeyCode::RightSuper),
            alt: is_key_down(KeyCode::LeftAlt) || is_key_down(KeyCode::RightAlt),
        };

        let mut keys = Vec::new();
        let named = [
            (KeyCode::Enter, Key::Enter),
            (KeyCode::KpEnter, Key::Enter),
            (KeyCode::Escape, Key::Escape),
            (KeyCode::Tab, Key::Tab),
            (KeyCode::Backspace, Key::Backspace),
            (KeyCode::Delete, Key::Delete),
            (KeyCode::Left, Key::Left),
            (KeyCode::Right, Key::Right),
            (KeyCode::Up, Key::Up),
            (KeyCode::Down, Key::Down),
            (KeyCode::Home, Key::Home),
            (KeyCode::End, Key::End),
            (KeyCode::PageUp, Key::PageUp),
            (KeyCode::PageDown, Key::PageDown),
        ];
        for (code, key) in named {
            if is_key_pressed(code) {
                keys.push(key);
            }
        }

        // Typed text; with Ctrl held the letter keys become shortcuts instead.
        while let Some(c) = get_char_pressed() {
            if !mods.ctrl && !c.is_control() {
                keys.push(Key::Char(c));
            }
        }
        if mods.ctrl {
            for code in get_keys_pressed() {
                if let Some(c) = shortcut_char(code) {
                    keys.push(Key::Char(c));
                }
            }
        }

        let ctrl_v = mods.ctrl && is_key_down(KeyCode::V);
        if ctrl_v && !self.prev_ctrl_v {
            if let Some(text) = mq_window::clipboard_get() {
                interaction.clipboard = text.clone();
                self.clipboard = text;
            }
        }
        self.prev_ctrl_v = ctrl_v;

        let (wx, wy) = mouse_wheel();
        let notch = WHEEL_CELLS * cell as f32;
        let scale = |v: f32| if v.abs() <= 3.0 { v * notch } else { v };
        let (mx, my) = mouse_position();

        RawInput {
            time: get_time(),
            window: Vec2i::new(screen_width() as i32, screen_height() as i32),
            pointer: Vec2i::new(mx as i32, my as i32),
            left_down: is_mouse_button_down(MouseButton::Left),
            right_down: is_mouse_button_down(MouseButton::Right),
            wheel: (scale(wx), scale(wy)),
            mods,
            keys,
            dropped_files: get_dropped_files()
                .into_iter()
                .filter_map(|f| f.path)
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }

    /// Mirrors copies and `SetClipboard` to the system clipboard.
    pub fn sync_clipboard(&mut self, interaction: &Interaction) {
        if interaction.clipboard != self.clipboard {
            self.clipboard = interaction.clipboard.clone();
            mq_window::clipboard_set(&self.clipboard);
        }
    }

    pub fn set_cursor(&self, cursor: CursorIcon) {
        let icon = match cursor {
            CursorIcon::Default => MqCursor::Default,
            CursorIcon::Pointer => MqCursor::Pointer,
            CursorIcon::Text => MqCursor::Text,
            CursorIcon::Move => MqCursor::Move,
            CursorIcon::ResizeH => MqCursor::EWResize,
            CursorIcon::ResizeV => MqCursor::NSResize,
            CursorIcon::Wait => MqCursor::Wait,
            CursorIcon::NotAllowed => MqCursor::NotAllowed,
        };
        mq_window::set_mouse_cursor(icon);
    }

    /// Paints every level of `frame`, lower levels dimmed under dialogs.
    pub async fn draw(&mut self, frame: &Frame, interaction: &mut Interaction, env: &Environment, tooltip: Option<&TooltipOut>) {
        let palette = *env.palette();
        clear_background(ply_to_macroquad_color(palette.background));
        let cell = frame.tree.cell.max(1);
        let thickness = frame.tree.scroll_thickness();

        for (li, level) in frame.tree.levels.iter().enumerate() {
            if li > 0 {
                set_clip(None);
                draw_rectangle(0.0, 0.0, screen_width(), screen_height(), MODAL_DIM);
                let r = level.rect;
                draw_rectangle(r.start.x as f32, r.start.y as f32, r.size.x as f32, r.size.y as f32, ply_to_macroquad_color(palette.background));
            }
            for node in &level.nodes {
                if node.crop.is_empty() && node.rect.is_empty() {
                    continue;
                }
                let state = NodeState {
                    hovered: interaction.hovered() == Some(node.hash),
                    pressed: interaction.pressed() == Some(node.hash),
                };
                let outer = outer_clip(level, node);
                set_clip(Some(outer));
                draw_chrome(node, &palette, cell);

                if !node.crop.is_empty() {
                    set_clip(Some(node.crop));
                    for (i, prim) in frame.buffer(node.hash).iter().enumerate() {
                        self.draw_prim(i, prim, node, cell, state, &palette, interaction).await;
                    }
                    if let Some((hash, pos)) = interaction.drop_target() {
                        if hash == node.hash {
                            draw_drop_marker(node.rect, pos, &palette);
                        }
                    }
                }

                set_clip(Some(outer));
                draw_scroll_bars(node, thickness, &palette);
            }
        }
        set_clip(None);

        if let Some(tip) = tooltip {
            self.draw_tooltip(tip, cell, &palette);
        }
        self.textures.clean();
    }

    async fn draw_prim(&mut self, index: usize, prim: &DrawPrim, node: &ResolvedNode, cell: i32, state: NodeState, palette: &Palette, interaction: &mut Interaction) {
        let origin = node.canvas.start;
        let c = cell as f32;
        match prim {
            DrawPrim::Rect { rect, tint, radius, border } => {
                let r = rect.to_px(origin, cell);
                let color = ply_to_macroquad_color(tint.pick(state.hovered, state.pressed));
                let (x, y, w, h) = (r.start.x as f32, r.start.y as f32, r.size.x as f32, r.size.y as f32);
                if *border > 0.0 {
                    draw_rectangle_lines(x, y, w, h, (border * c).max(1.0), color);
                } else if *radius > 0.0 {
                    draw_rounded_rectangle(x, y, w, h, radius * c, color);
                } else {
                    draw_rectangle(x, y, w, h, color);
                }
            }
            DrawPrim::Circle { rect, tint, border } => {
                let r = rect.to_px(origin, cell);
                let center = r.center();
                let radius = r.size.x.min(r.size.y) as f32 / 2.0;
                let color = ply_to_macroquad_color(tint.pick(state.hovered, state.pressed));
                if *border > 0.0 {
                    draw_circle_lines(center.x as f32, center.y as f32, radius, (border * c).max(1.0), color);
                } else {
                    draw_good_circle(center.x as f32, center.y as f32, radius, color);
                }
            }
            DrawPrim::Line { rect, start, end, tint, width } => {
                let r = rect.to_px(origin, cell);
                let at = |f: (f32, f32)| (r.start.x as f32 + f.0 * r.size.x as f32, r.start.y as f32 + f.1 * r.size.y as f32);
                let (x1, y1) = at(*start);
                let (x2, y2) = at(*end);
                let color = ply_to_macroquad_color(tint.pick(state.hovered, state.pressed));
                draw_line(x1, y1, x2, y2, (width * c).max(1.0), color);
            }
            DrawPrim::File { rect, path, tint, align } => {
                let r = rect.to_px(origin, cell);
                let color = ply_to_macroquad_color(tint.pick(state.hovered, state.pressed));
                if let Some(texture) = self.textures.get_or_load(path).await {
                    let (w, h) = fit(texture.width(), texture.height(), r.size.x as f32, r.size.y as f32);
                    let (dx, dy) = align.place((r.size.x as f32, r.size.y as f32), (w, h));
                    draw_texture_ex(
                        texture,
                        r.start.x as f32 + dx,
                        r.start.y as f32 + dy,
                        color,
                        DrawTextureParams {
                            dest_size: Some(vec2(w, h)),
                            ..Default::default()
                        },
                    );
                }
            }
            DrawPrim::Text(text) => {
                let edit = interaction.edit_mut().filter(|e| e.hash == node.hash && text.flags.editable);
                self.draw_text_prim(index, text, node, cell, state, palette, edit);
            }
            DrawPrim::Brush { rect, color, width, points } => {
                let r = rect.to_px(origin, cell);
                let color = ply_to_macroquad_color(*color);
                let at = |p: &(f32, f32)| (r.start.x as f32 + p.0 * r.size.x as f32, r.start.y as f32 + p.1 * r.size.y as f32);
                let thickness = (width * c).max(1.0);
                for pair in points.windows(2) {
                    let (x1, y1) = at(&pair[0]);
                    let (x2, y2) = at(&pair[1]);
                    draw_line(x1, y1, x2, y2, thickness, color);
                }
                if points.len() == 1 {
                    let (x, y) = at(&points[0]);
                    draw_good_circle(x, y, thickness / 2.0, color);
                }
            }
            DrawPrim::Cursor { .. } | DrawPrim::Tooltip { .. } => {}
        }
    }

    fn draw_text_prim(&mut self, index: usize, text: &TextPrim, node: &ResolvedNode, cell: i32, state: NodeState, palette: &Palette, edit: Option<&mut EditState>) {
        let line_px = cell as f32;
        let inner = text.inner().to_px(node.canvas.start, cell);
        let size = font_size(line_px);
        let font = self.measure.font();
        let value = edit.as_ref().map(|e| e.text.as_str()).unwrap_or(&text.text);
        let ghost = value.is_empty();
        let shown = display_text(value, &text.ghost, text.flags.password);
        let mut color = ply_to_macroquad_color(text.tint.pick(state.hovered, state.pressed));
        if ghost {
            color.a *= 0.5;
        }

        let width = if text.flags.linewrap { inner.size.x as f32 } else { 0.0 };
        let layout = || -> Vec<VisualLine> {
            if text.flags.multiline || text.flags.linewrap {
                wrap_lines(&shown, width, line_px, &self.measure)
            } else {
                vec![VisualLine {
                    char_count: shown.chars().count(),
                    text: shown.replace('\n', " "),
                    global_char_start: 0,
                }]
            }
        };
        // The edit buffer changes between refreshes, so only widget text is
        // cached.
        let owned;
        let lines: &[VisualLine] = if edit.is_some() {
            owned = layout();
            &owned
        } else {
            self.lines.lines(node.hash, index, width, line_px, layout)
        };

        let block_h = lines.len() as f32 * line_px;
        let (_, dy) = text.align.place((inner.size.x as f32, inner.size.y as f32), (0.0, block_h));
        let top = inner.start.y as f32 + dy;
        let dims = measure_text("Ag", font, size, 1.0);
        let baseline = (line_px - dims.height) / 2.0 + dims.offset_y;

        let Some(edit) = edit else {
            for (i, line) in lines.iter().enumerate() {
                let w = self.measure.width(&line.text, line_px);
                let (dx, _) = text.align.place((inner.size.x as f32, 0.0), (w, 0.0));
                draw_text_ex(
                    &line.text,
                    inner.start.x as f32 + dx,
                    top + i as f32 * line_px + baseline,
                    TextParams {
                        font,
                        font_size: size,
                        color,
                        ..Default::default()
                    },
                );
            }
            return;
        };

        // Focused editbox: the edit buffer replaces the widget's value and
        // gets a caret and selection.
        let shown_edit = display_text(&edit.text, "", text.flags.password);
        if let Some((click_x, shift)) = edit.click.take() {
            if !edit.multiline {
                let positions = compute_char_x_positions(&shown_edit, line_px, &self.measure);
                let x = click_x - (inner.start.x - node.canvas.start.x) as f32;
                edit.click_to_cursor(x, &positions, shift);
            }
        }

        let edit_lines = if edit.multiline {
            let width = if text.flags.linewrap { inner.size.x as f32 } else { 0.0 };
            wrap_lines(&shown_edit, width, line_px, &self.measure)
        } else {
            vec![VisualLine {
                char_count: shown_edit.chars().count(),
                text: shown_edit.clone(),
                global_char_start: 0,
            }]
        };
        let (cursor_line, cursor_col) = cursor_to_visual_pos(&edit_lines, edit.cursor_pos);
        if !edit.multiline {
            let positions = compute_char_x_positions(&shown_edit, line_px, &self.measure);
            let caret = positions.get(edit.cursor_pos).copied().unwrap_or(0.0);
            edit.ensure_cursor_visible(caret, inner.size.x as f32);
        }
        let scroll = if edit.multiline { 0.0 } else { edit.scroll_offset };
        let selection = edit.selection_range();
        let highlight = ply_to_macroquad_color(palette.primary.with_alpha(90));
        let text_color = ply_to_macroquad_color(text.tint.normal);
        let edit_top = if edit.multiline { inner.start.y as f32 } else { top };

        for (i, line) in edit_lines.iter().enumerate() {
            let y = edit_top + i as f32 * line_px;
            let positions = compute_char_x_positions(&line.text, line_px, &self.measure);
            let x0 = inner.start.x as f32 - scroll;
            if let Some((s, e)) = selection {
                let ls = s.clamp(line.global_char_start, line.global_char_start + line.char_count) - line.global_char_start;
                let le = e.clamp(line.global_char_start, line.global_char_start + line.char_count) - line.global_char_start;
                if le > ls {
                    let sx = positions.get(ls).copied().unwrap_or(0.0);
                    let ex = positions.get(le).copied().unwrap_or(0.0);
                    draw_rectangle(x0 + sx, y, ex - sx, line_px, highlight);
                }
            }
            draw_text_ex(
                &line.text,
                x0,
                y + baseline,
                TextParams {
                    font,
                    font_size: size,
                    color: text_color,
                    ..Default::default()
                },
            );
            if i == cursor_line && edit.cursor_visible() {
                let cx = positions.get(cursor_col).copied().unwrap_or(0.0);
                draw_line(x0 + cx, y + line_px * 0.15, x0 + cx, y + line_px * 0.85, 1.5, text_color);
            }
        }
    }

    fn draw_tooltip(&self, tip: &TooltipOut, cell: i32, palette: &Palette) {
        let line_px = cell as f32;
        let font = self.measure.font();
        let size = font_size(line_px * 0.8);
        let w = self.measure.width(&tip.text, line_px * 0.8) + line_px * 0.4;
        let h = line_px * 0.8;
        let mut x = tip.anchor.start.x as f32;
        let mut y = tip.anchor.end().y as f32 + 2.0;
        if y + h > screen_height() {
            y = tip.anchor.start.y as f32 - h - 2.0;
        }
        if x + w > screen_width() {
            x = (screen_width() - w).max(0.0);
        }
        draw_rectangle(x, y, w, h, ply_to_macroquad_color(palette.text));
        let dims = measure_text(&tip.text, font, size, 1.0);
        draw_text_ex(
            &tip.text,
            x + line_px * 0.2,
            y + (h - dims.height) / 2.0 + dims.offset_y,
            TextParams {
                font,
                font_size: size,
                color: ply_to_macroquad_color(palette.background),
                ..Default::default()
            },
        );
    }
}

/// The node's rect clipped by its parent; chrome and scroll bars live here.
fn outer_clip(level: &Level, node: &ResolvedNode) -> RectPx {
    let parent = node.parent.and_then(|p| level.nodes.get(p)).map(|p| p.crop).unwrap_or(level.rect);
    node.rect.intersect(&parent)
}

fn draw_chrome(node: &ResolvedNode, palette: &Palette, cell: i32) {
    let r = node.rect;
    let (x, y, w, h) = (r.start.x as f32, r.start.y as f32, r.size.x as f32, r.size.y as f32);
    let radius = if node.props.rounded { cell as f32 * 0.2 } else { 0.0 };
    if let Some(bg) = node.props.background {
        let color = if node.props.enable { bg } else { bg.mix(palette.disabled, 0.5) };
        draw_rounded_rectangle(x, y, w, h, radius, ply_to_macroquad_color(color));
    }
    if let Some(border) = node.props.border {
        draw_rectangle_lines(x, y, w, h, 1.0, ply_to_macroquad_color(border));
    }
}

fn draw_scroll_bars(node: &ResolvedNode, thickness: i32, palette: &Palette) {
    let track = ply_to_macroquad_color(palette.border.with_alpha(60));
    let thumb = ply_to_macroquad_color(palette.border);
    if let Some(bar) = node.v_bar(thickness) {
        draw_rectangle(bar.start.x as f32, bar.start.y as f32, bar.size.x as f32, bar.size.y as f32, track);
        let (offset, len) = node.v_scroll.thumb(bar.size.y);
        draw_rectangle(bar.start.x as f32 + 2.0, (bar.start.y + offset) as f32, (bar.size.x - 4).max(1) as f32, len as f32, thumb);
    }
    if let Some(bar) = node.h_bar(thickness) {
        draw_rectangle(bar.start.x as f32, bar.start.y as f32, bar.size.x as f32, bar.size.y as f32, track);
        let (offset, len) = node.h_scroll.thumb(bar.size.x);
        draw_rectangle((bar.start.x + offset) as f32, bar.start.y as f32 + 2.0, len as f32, (bar.size.y - 4).max(1) as f32, thumb);
    }
}

fn draw_drop_marker(rect: RectPx, pos: DropPos, palette: &Palette) {
    let color = ply_to_macroquad_color(palette.primary);
    let (x, y, w, h) = (rect.start.x as f32, rect.start.y as f32, rect.size.x as f32, rect.size.y as f32);
    match pos {
        DropPos::Inside => draw_rectangle_lines(x, y, w, h, 2.0, color),
        DropPos::VerticalBefore => draw_line(x, y + 1.0, x + w, y + 1.0, 3.0, color),
        DropPos::VerticalAfter => draw_line(x, y + h - 1.0, x + w, y + h - 1.0, 3.0, color),
        DropPos::HorizontalBefore => draw_line(x + 1.0, y, x + 1.0, y + h, 3.0, color),
        DropPos::HorizontalAfter => draw_line(x + w - 1.0, y, x + w - 1.0, y + h, 3.0, color),
    }
}

/// Largest size with the image's aspect ratio that fits `max_w` x `max_h`.
fn fit(w: f32, h: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    if w <= 0.0 || h <= 0.0 {
        return (max_w, max_h);
    }
    let scale = (max_w / w).min(max_h / h);
    (w * scale, h * scale)
}

fn shortcut_char(code: KeyCode) -> Option<char> {
    let c = match code {
        KeyCode::A => 'a',
        KeyCode::B => 'b',
        KeyCode::C => 'c',
        KeyCode::D => 'd',
        KeyCode::E => 'e',
        KeyCode::F => 'f',
        KeyCode::G => 'g',
        KeyCode::H => 'h',
        KeyCode::I => 'i',
        KeyCode::J => 'j',
        KeyCode::K => 'k',
        KeyCode::L => 'l',
        KeyCode::M => 'm',
        KeyCode::N => 'n',
        KeyCode::O => 'o',
        KeyCode::P => 'p',
        KeyCode::Q => 'q',
        KeyCode::R => 'r',
        KeyCode::S => 's',
        KeyCode::T => 't',
        KeyCode::U => 'u',
        KeyCode::V => 'v',
        KeyCode::W => 'w',
        KeyCode::X => 'x',
        KeyCode::Y => 'y',
        KeyCode::Z => 'z',
        KeyCode::Equal | KeyCode::KpAdd => '+',
        KeyCode::Minus | KeyCode::KpSubtract => '-',
        _ => return None,
    };
    Some(c)
}

