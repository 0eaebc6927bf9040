//! Host-side text editing.
//!
//! At most one node edits at a time. The host keeps the temp value here,
//! mutates it per keystroke and tells the widget through `set_edit` inputs.

use crate::id::NodeHash;
use crate::input::{Key, Modifiers};
use crate::text::{TextMeasure, VisualLine};

/// Context commands scheduled by `Copy`, `Cut`, `Paste`, `SelectAll` and
/// `Record`, consumed on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingEdit {
    pub copy: bool,
    pub cut: bool,
    pub paste: bool,
    pub select_all: bool,
    pub record: bool,
}

impl PendingEdit {
    pub fn any(&self) -> bool {
        self.copy || self.cut || self.paste || self.select_all || self.record
    }
}

/// What a key did to the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    None,
    /// The temp value changed.
    Changed,
    /// Enter: send the value with `commit = true` and leave edit.
    Commit,
    /// Esc: the temp value was reverted; leave edit with `commit = false`.
    Cancel,
}

#[derive(Debug, Clone)]
pub struct EditState {
    pub hash: NodeHash,
    /// Value reported by `get_editbox` when the edit started.
    pub original: String,
    /// Current temp value.
    pub text: String,
    /// Cursor as a char index, `0..=len`.
    pub cursor_pos: usize,
    /// Other end of the selection; the cursor is the moving end.
    pub selection_anchor: Option<usize>,
    /// Pixels scrolled off the left of a single-line field.
    pub scroll_offset: f32,
    /// Seconds since the last cursor move.
    pub cursor_blink_timer: f64,
    pub multiline: bool,
    pub max_length: Option<usize>,
    pub pending: PendingEdit,
    /// Press not yet mapped to a character: x in pixels from the canvas's
    /// left edge, and whether Shift was held. Resolved where the font is.
    pub click: Option<(f32, bool)>,
}

impl EditState {
    /// Starts editing `value`, with the cursor at the end.
    pub fn begin(hash: NodeHash, value: &str, multiline: bool) -> Self {
        Self {
            hash,
            original: value.to_string(),
            text: value.to_string(),
            cursor_pos: value.chars().count(),
            selection_anchor: None,
            scroll_offset: 0.0,
            cursor_blink_timer: 0.0,
            multiline,
            max_length: None,
            pending: PendingEdit::default(),
            click: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.text != self.original
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Selection as ordered char indices.
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        self.selection_anchor.map(|anchor| {
            let start = anchor.min(self.cursor_pos);
            let end = anchor.max(self.cursor_pos);
            (start, end)
        })
    }

    pub fn selected_text(&self) -> &str {
        match self.selection_range() {
            Some((start, end)) => &self.text[char_index_to_byte(&self.text, start)..char_index_to_byte(&self.text, end)],
            None => "",
        }
    }

    /// Removes chars `start..end` and leaves the cursor at `start`.
    fn remove_chars(&mut self, start: usize, end: usize) {
        let from = char_index_to_byte(&self.text, start);
        let to = char_index_to_byte(&self.text, end);
        self.text.replace_range(from..to, "");
        self.cursor_pos = start;
    }

    /// Removes the selected chars. False when nothing was selected.
    pub fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection_range() else {
            return false;
        };
        self.remove_chars(start, end);
        self.selection_anchor = None;
        start != end
    }

    /// Insert text at the cursor, replacing any selection. Single-line edits
    /// drop line breaks.
    pub fn insert_text(&mut self, s: &str) {
        self.delete_selection();
        let filtered: String = if self.multiline {
            s.to_string()
        } else {
            s.chars().filter(|&c| c != '\n' && c != '\r').collect()
        };
        let char_count = self.len();
        let insert_count = filtered.chars().count();
        let allowed = match self.max_length {
            Some(max) => insert_count.min(max.saturating_sub(char_count)),
            None => insert_count,
        };
        if allowed == 0 {
            return;
        }
        let kept: String = filtered.chars().take(allowed).collect();
        let at = char_index_to_byte(&self.text, self.cursor_pos);
        self.text.insert_str(at, &kept);
        self.cursor_pos += allowed;
        self.reset_blink();
    }

    /// Moves the cursor to `target`, extending the selection when `shift`.
    fn move_to(&mut self, target: usize, shift: bool) {
        if shift && self.selection_anchor.is_none() {
            self.selection_anchor = Some(self.cursor_pos);
        }
        self.cursor_pos = target.min(self.len());
        if !shift || self.selection_anchor == Some(self.cursor_pos) {
            self.selection_anchor = None;
        }
        self.reset_blink();
    }

    pub fn move_left(&mut self, shift: bool) {
        if !shift {
            // collapse to the start of a selection
            if let Some((start, _)) = self.selection_range() {
                self.move_to(start, false);
                return;
            }
        }
        self.move_to(self.cursor_pos.saturating_sub(1), shift);
    }

    pub fn move_right(&mut self, shift: bool) {
        if !shift {
            if let Some((_, end)) = self.selection_range() {
                self.move_to(end, false);
                return;
            }
        }
        self.move_to(self.cursor_pos + 1, shift);
    }

    pub fn move_word_left(&mut self, shift: bool) {
        self.move_to(find_word_boundary_left(&self.text, self.cursor_pos), shift);
    }

    pub fn move_word_right(&mut self, shift: bool) {
        self.move_to(find_word_boundary_right(&self.text, self.cursor_pos), shift);
    }

    pub fn move_home(&mut self, shift: bool) {
        let target = if self.multiline { line_start_char_pos(&self.text, self.cursor_pos) } else { 0 };
        self.move_to(target, shift);
    }

    pub fn move_end(&mut self, shift: bool) {
        let target = if self.multiline { line_end_char_pos(&self.text, self.cursor_pos) } else { self.len() };
        self.move_to(target, shift);
    }

    pub fn move_up(&mut self, shift: bool) {
        let (line, col) = line_and_column(&self.text, self.cursor_pos);
        let target = if line == 0 { 0 } else { char_pos_from_line_col(&self.text, line - 1, col) };
        self.move_to(target, shift);
    }

    pub fn move_down(&mut self, shift: bool) {
        let (line, col) = line_and_column(&self.text, self.cursor_pos);
        let line_count = self.text.chars().filter(|&c| c == '\n').count() + 1;
        let target = if line + 1 >= line_count {
            self.len()
        } else {
            char_pos_from_line_col(&self.text, line + 1, col)
        };
        self.move_to(target, shift);
    }

    pub fn select_all(&mut self) {
        if !self.text.is_empty() {
            self.selection_anchor = Some(0);
            self.cursor_pos = self.len();
        }
        self.reset_blink();
    }

    /// Deletes the selection, or else `start..end` around the cursor.
    fn erase(&mut self, start: usize, end: usize) {
        if !self.delete_selection() && start < end {
            self.remove_chars(start, end.min(self.len()));
        }
        self.reset_blink();
    }

    /// Backspace.
    pub fn backspace(&mut self) {
        self.erase(self.cursor_pos.saturating_sub(1), self.cursor_pos);
    }

    /// Delete.
    pub fn delete_forward(&mut self) {
        self.erase(self.cursor_pos, self.cursor_pos + 1);
    }

    /// Ctrl+Backspace.
    pub fn backspace_word(&mut self) {
        self.erase(find_word_boundary_left(&self.text, self.cursor_pos), self.cursor_pos);
    }

    /// Ctrl+Delete.
    pub fn delete_word_forward(&mut self) {
        self.erase(self.cursor_pos, find_word_boundary_right(&self.text, self.cursor_pos));
    }

    /// Places the cursor at a click `click_x` pixels into the text.
    pub fn click_to_cursor(&mut self, click_x: f32, char_x_positions: &[f32], shift: bool) {
        let target = find_nearest_char_boundary(click_x + self.scroll_offset, char_x_positions);
        self.move_to(target, shift);
    }

    /// Double click: selects the word (or whitespace run) under `char_pos`.
    pub fn select_word_at(&mut self, char_pos: usize) {
        let (start, end) = find_word_at(&self.text, char_pos);
        if start != end {
            self.selection_anchor = Some(start);
            self.cursor_pos = end;
        }
        self.reset_blink();
    }

    pub fn reset_blink(&mut self) {
        self.cursor_blink_timer = 0.0;
    }

    pub fn tick(&mut self, dt: f64) {
        self.cursor_blink_timer += dt;
    }

    pub fn cursor_visible(&self) -> bool {
        (self.cursor_blink_timer % 1.06) < 0.53
    }

    /// Scrolls a single-line field so the cursor, `cursor_x` pixels into the
    /// text, stays inside `visible_width`.
    pub fn ensure_cursor_visible(&mut self, cursor_x: f32, visible_width: f32) {
        let lo = (cursor_x - visible_width).max(0.0);
        self.scroll_offset = self.scroll_offset.clamp(lo, cursor_x.max(lo));
    }

    /// Applies one key press.
    pub fn key(&mut self, key: Key, mods: Modifiers) -> EditEvent {
        let old = self.text.clone();
        let event = match key {
            Key::Char(c) if mods.ctrl => {
                match c.to_ascii_lowercase() {
                    'a' => self.pending.select_all = true,
                    'c' => self.pending.copy = true,
                    'x' => self.pending.cut = true,
                    'v' => self.pending.paste = true,
                    _ => {}
                }
                EditEvent::None
            }
            Key::Char(c) => {
                let mut buf = [0u8; 4];
                self.insert_text(c.encode_utf8(&mut buf));
                EditEvent::Changed
            }
            Key::Enter if self.multiline && mods.shift => {
                self.insert_text("\n");
                EditEvent::Changed
            }
            Key::Enter | Key::Tab => EditEvent::Commit,
            Key::Escape => {
                self.text = self.original.clone();
                self.cursor_pos = self.cursor_pos.min(self.len());
                self.selection_anchor = None;
                EditEvent::Cancel
            }
            Key::Backspace => {
                if mods.ctrl {
                    self.backspace_word();
                } else {
                    self.backspace();
                }
                EditEvent::Changed
            }
            Key::Delete => {
                if mods.ctrl {
                    self.delete_word_forward();
                } else {
                    self.delete_forward();
                }
                EditEvent::Changed
            }
            Key::Left if mods.ctrl => {
                self.move_word_left(mods.shift);
                EditEvent::None
            }
            Key::Right if mods.ctrl => {
                self.move_word_right(mods.shift);
                EditEvent::None
            }
            Key::Left => {
                self.move_left(mods.shift);
                EditEvent::None
            }
            Key::Right => {
                self.move_right(mods.shift);
                EditEvent::None
            }
            Key::Up if self.multiline => {
                self.move_up(mods.shift);
                EditEvent::None
            }
            Key::Down if self.multiline => {
                self.move_down(mods.shift);
                EditEvent::None
            }
            Key::Home | Key::Up | Key::PageUp => {
                self.move_home(mods.shift);
                EditEvent::None
            }
            Key::End | Key::Down | Key::PageDown => {
                self.move_end(mods.shift);
                EditEvent::None
            }
        };
        // edits that left the text as it was report nothing
        if event == EditEvent::Changed && self.text == old {
            EditEvent::None
        } else {
            event
        }
    }

    /// Consumes the pending context commands against the host clipboard.
    pub fn apply_pending(&mut self, clipboard: &mut String) -> EditEvent {
        let pending = std::mem::take(&mut self.pending);
        let old = self.text.clone();
        if pending.select_all {
            self.select_all();
        }
        if pending.copy || pending.cut {
            let selected = self.selected_text();
            if !selected.is_empty() {
                *clipboard = selected.to_string();
            }
        }
        if pending.cut {
            self.delete_selection();
        }
        if pending.paste && !clipboard.is_empty() {
            let text = clipboard.clone();
            self.insert_text(&text);
        }
        if pending.record {
            tracing::debug!(hash = self.hash, "record requested without a capture backend");
        }
        if self.text != old {
            EditEvent::Changed
        } else {
            EditEvent::None
        }
    }
}

/// Byte offset of char `idx`; the string length past the end.
pub fn char_index_to_byte(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b)
}

/// Char index of the start of the line containing `char_pos`.
pub fn line_start_char_pos(text: &str, char_pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut i = char_pos.min(chars.len());
    while i > 0 && chars[i - 1] != '\n' {
        i -= 1;
    }
    i
}

/// Char index just before the '\n' ending the line, or the text end.
pub fn line_end_char_pos(text: &str, char_pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut i = char_pos.min(len);
    while i < len && chars[i] != '\n' {
        i += 1;
    }
    i
}

/// Hard line and column of `char_pos`.
pub fn line_and_column(text: &str, char_pos: usize) -> (usize, usize) {
    let before: Vec<char> = text.chars().take(char_pos).collect();
    let line = before.iter().filter(|&&c| c == '\n').count();
    let col = before.iter().rev().take_while(|&&c| c != '\n').count();
    (line, col)
}

/// Char index at `target_col` of hard line `target_line`; columns past the
/// line end stop at the end.
pub fn char_pos_from_line_col(text: &str, target_line: usize, target_col: usize) -> usize {
    let mut line = 0;
    let mut col = 0;
    for (i, ch) in text.chars().enumerate() {
        if line == target_line && col == target_col {
            return i;
        }
        if ch == '\n' {
            if line == target_line {
                return i;
            }
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    text.chars().count()
}

/// `(visual_line_index, column)` of a cursor over wrapped lines. A cursor at
/// a soft wrap goes to the start of the continuation line.
pub fn cursor_to_visual_pos(visual_lines: &[VisualLine], cursor_pos: usize) -> (usize, usize) {
    for (i, vl) in visual_lines.iter().enumerate() {
        let line_end = vl.global_char_start + vl.char_count;
        if cursor_pos < line_end || i == visual_lines.len() - 1 {
            return (i, cursor_pos.saturating_sub(vl.global_char_start));
        }
        if cursor_pos == line_end {
            if let Some(next) = visual_lines.get(i + 1) {
                if next.global_char_start == line_end {
                    return (i + 1, 0);
                }
            }
            return (i, cursor_pos - vl.global_char_start);
        }
    }
    (0, 0)
}

/// Nearest character boundary to pixel `click_x`. `char_x_positions` has
/// `char_count + 1` entries.
pub fn find_nearest_char_boundary(click_x: f32, char_x_positions: &[f32]) -> usize {
    char_x_positions
        .iter()
        .enumerate()
        .min_by(|a, b| (click_x - a.1).abs().total_cmp(&(click_x - b.1).abs()))
        .map_or(0, |(i, _)| i)
}

/// Word boundary to the left of `pos` (Ctrl+Left, Ctrl+Backspace).
pub fn find_word_boundary_left(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut i = pos.min(chars.len());
    while i > 0 && chars[i - 1].is_whitespace() {
        i -= 1;
    }
    while i > 0 && !chars[i - 1].is_whitespace() {
        i -= 1;
    }
    i
}

/// Word boundary to the right of `pos` (Ctrl+Right, Ctrl+Delete).
pub fn find_word_boundary_right(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if pos >= len {
        return len;
    }
    let mut i = pos;
    while i < len && !chars[i].is_whitespace() {
        i += 1;
    }
    while i < len && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

/// Word `(start, end)` at `pos`; on whitespace, the whitespace run.
pub fn find_word_at(text: &str, pos: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if pos >= len {
        return (pos, pos);
    }
    let word = !chars[pos].is_whitespace();
    let same = |c: char| c.is_whitespace() != word;
    let mut start = pos;
    while start > 0 && same(chars[start - 1]) {
        start -= 1;
    }
    let mut end = pos;
    while end < len && same(chars[end]) {
        end += 1;
    }
    (start, end)
}

/// String to draw: the placeholder when empty, bullets for passwords.
pub fn display_text(text: &str, placeholder: &str, is_password: bool) -> String {
    match (text.is_empty(), is_password) {
        (true, _) => placeholder.to_owned(),
        (false, true) => "•".repeat(text.chars().count()),
        (false, false) => text.to_owned(),
    }
}

/// X positions of every character boundary of `display_text`, `len + 1`
/// entries, measured at `line_px`.
pub fn compute_char_x_positions(display_text: &str, line_px: f32, measure: &dyn TextMeasure) -> Vec<f32> {
    std::iter::once(0.0)
        .chain(
            display_text
                .char_indices()
                .map(|(b, c)| measure.width(&display_text[..b + c.len_utf8()], line_px)),
        )
        .collect()
}
