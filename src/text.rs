use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::diff::FrameDiff;
use crate::id::NodeHash;

/// Host-side text measuring. Widgets never measure text themselves; they
/// describe it through [`AutoSize::Text`] and the host answers with the
/// current font.
pub trait TextMeasure {
    /// Width in pixels of `text` laid out on a single line, for a font whose
    /// line height is `line_px`.
    fn width(&self, text: &str, line_px: f32) -> f32;
}

/// Monospace approximation: every char advances `advance * line_px`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonoMeasure {
    pub advance: f32,
}

impl Default for MonoMeasure {
    fn default() -> Self {
        Self { advance: 0.5 }
    }
}

impl TextMeasure for MonoMeasure {
    fn width(&self, text: &str, line_px: f32) -> f32 {
        text.chars().count() as f32 * self.advance * line_px
    }
}

/// Self-size hint reported by a node's `auto_resize` callback, in cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutoSize {
    Fixed {
        w: f32,
        h: f32,
    },
    Range {
        min_w: f32,
        min_h: f32,
        max_w: f32,
        max_h: f32,
    },
    /// Sized from its text extent, measured on the host.
    Text {
        text: String,
        multiline: bool,
        linewrap: bool,
        /// Horizontal margin added on both sides, in cells.
        margin: f32,
        /// Wrapping width in cells; zero wraps only on hard breaks.
        max_width: f32,
    },
}

/// Minimum and maximum self-size of a node in cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intrinsic {
    pub min: (f32, f32),
    pub max: (f32, f32),
}

impl Intrinsic {
    pub const ONE: Intrinsic = Intrinsic {
        min: (1.0, 1.0),
        max: (1.0, 1.0),
    };

    pub const fn fixed(w: f32, h: f32) -> Self {
        Self {
            min: (w, h),
            max: (w, h),
        }
    }
}

impl AutoSize {
    pub fn text(text: impl Into<String>) -> Self {
        AutoSize::Text {
            text: text.into(),
            multiline: false,
            linewrap: false,
            margin: 0.1,
            max_width: 0.0,
        }
    }

    pub fn measure(&self, measure: &dyn TextMeasure, cell: i32) -> Intrinsic {
        match self {
            AutoSize::Fixed { w, h } => Intrinsic::fixed(*w, *h),
            AutoSize::Range {
                min_w,
                min_h,
                max_w,
                max_h,
            } => Intrinsic {
                min: (*min_w, *min_h),
                max: (max_w.max(*min_w), max_h.max(*min_h)),
            },
            AutoSize::Text {
                text,
                multiline,
                linewrap,
                margin,
                max_width,
            } => measure_text(text, *multiline, *linewrap, *margin, *max_width, measure, cell),
        }
    }
}

fn measure_text(
    text: &str,
    multiline: bool,
    linewrap: bool,
    margin: f32,
    max_width: f32,
    measure: &dyn TextMeasure,
    cell: i32,
) -> Intrinsic {
    let line_px = cell.max(1) as f32;
    let to_cells = |px: f32| px / line_px + 2.0 * margin;
    if text.is_empty() {
        // Still one line tall so an empty row stays clickable.
        return Intrinsic::fixed(to_cells(0.0), 1.0);
    }

    if !multiline {
        let w = to_cells(measure.width(text, line_px));
        return Intrinsic::fixed(w, 1.0);
    }

    let wrap_px = if linewrap { (max_width - 2.0 * margin).max(0.0) * line_px } else { 0.0 };
    let lines = wrap_lines(text, wrap_px, line_px, measure);
    let widest = lines
        .iter()
        .map(|l| measure.width(&l.text, line_px))
        .fold(0.0f32, f32::max);
    let h = lines.len() as f32;

    if linewrap {
        // The narrowest sensible width is the longest word.
        let longest_word = text
            .split_whitespace()
            .map(|w| measure.width(w, line_px))
            .fold(0.0f32, f32::max);
        Intrinsic {
            min: (to_cells(longest_word), h),
            max: (to_cells(widest), h),
        }
    } else {
        Intrinsic::fixed(to_cells(widest), h)
    }
}

/// Splits text on `'\n'`, returning each line with the char index it starts at.
pub fn split_lines(text: &str) -> Vec<(usize, &str)> {
    let mut result = Vec::new();
    let mut char_start = 0;
    let mut byte_start = 0;
    for (byte_idx, ch) in text.char_indices() {
        if ch == '\n' {
            result.push((char_start, &text[byte_start..byte_idx]));
            char_start += text[byte_start..byte_idx].chars().count() + 1;
            byte_start = byte_idx + 1;
        }
    }
    result.push((char_start, &text[byte_start..]));
    result
}

/// A single visual line after wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLine {
    pub text: String,
    /// Char index where this line starts in the full text.
    pub global_char_start: usize,
    pub char_count: usize,
}

/// Word-wraps `text` into lines no wider than `max_width` pixels. Hard breaks
/// always split; `max_width <= 0` disables soft wrapping.
pub fn wrap_lines(text: &str, max_width: f32, line_px: f32, measure: &dyn TextMeasure) -> Vec<VisualLine> {
    let mut result = Vec::new();

    for (global_start, line_text) in split_lines(text) {
        let whole = VisualLine {
            text: line_text.to_string(),
            global_char_start: global_start,
            char_count: line_text.chars().count(),
        };
        if line_text.is_empty() || max_width <= 0.0 || measure.width(line_text, line_px) <= max_width {
            result.push(whole);
            continue;
        }

        let chars: Vec<char> = line_text.chars().collect();
        let total = chars.len();
        let mut start = 0;
        while start < total {
            let mut fit = 0;
            for i in 1..=(total - start) {
                let part: String = chars[start..start + i].iter().collect();
                if measure.width(&part, line_px) > max_width {
                    break;
                }
                fit = i;
            }
            let fit = fit.max(1);

            let take = if start + fit < total {
                (1..=fit)
                    .rev()
                    .find(|&j| chars[start + j - 1] == ' ')
                    .unwrap_or(fit)
            } else {
                fit
            };
            result.push(VisualLine {
                text: chars[start..start + take].iter().collect(),
                global_char_start: global_start + start,
                char_count: take,
            });
            start += take;
        }
    }

    result
}

/// Wrapped lines of text primitives, keyed by node and primitive index.
///
/// An entry stays valid until its node shows up in a [`FrameDiff`]; the
/// wrap width and line height are rechecked on every lookup.
#[derive(Debug, Default)]
pub struct LineCache {
    entries: FxHashMap<(NodeHash, usize), CachedLines>,
}

#[derive(Debug)]
struct CachedLines {
    width: f32,
    line_px: f32,
    lines: Vec<VisualLine>,
}

impl LineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached lines of primitive `prim` of node `hash`, calling `wrap` on a
    /// miss.
    pub fn lines<F>(&mut self, hash: NodeHash, prim: usize, width: f32, line_px: f32, wrap: F) -> &[VisualLine]
    where
        F: FnOnce() -> Vec<VisualLine>,
    {
        let entry = self.entries.entry((hash, prim)).or_insert_with(|| CachedLines {
            width: f32::NAN,
            line_px: f32::NAN,
            lines: Vec::new(),
        });
        if entry.width != width || entry.line_px != line_px {
            *entry = CachedLines {
                width,
                line_px,
                lines: wrap(),
            };
        }
        &entry.lines
    }

    /// Drops the entries of every node `damage` touches. Returns how many
    /// were dropped.
    pub fn invalidate(&mut self, damage: &FrameDiff) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(hash, _), _| !damage.touches(*hash));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_one_line_tall() {
        let size = AutoSize::Text {
            text: String::new(),
            multiline: true,
            linewrap: false,
            margin: 0.0,
            max_width: 0.0,
        };
        assert_eq!(size.measure(&MonoMeasure::default(), 40), Intrinsic::fixed(0.0, 1.0));
    }

    #[test]
    fn single_line_width_in_cells() {
        // 4 chars * 0.5 advance = 2 cells, plus 0.1 margin each side
        let size = AutoSize::text("abcd");
        let got = size.measure(&MonoMeasure::default(), 40);
        assert!((got.min.0 - 2.2).abs() < 1e-4);
        assert_eq!(got.min.1, 1.0);
        assert_eq!(got.min, got.max);
    }

    #[test]
    fn multiline_counts_hard_breaks() {
        let size = AutoSize::Text {
            text: "a\nbb\nccc".into(),
            multiline: true,
            linewrap: false,
            margin: 0.0,
            max_width: 0.0,
        };
        let got = size.measure(&MonoMeasure::default(), 10);
        assert_eq!(got.max, (1.5, 3.0));
    }

    #[test]
    fn linewrap_min_is_the_longest_word() {
        let size = AutoSize::Text {
            text: "aa bbbb c".into(),
            multiline: true,
            linewrap: true,
            margin: 0.0,
            max_width: 3.0,
        };
        let got = size.measure(&MonoMeasure::default(), 10);
        assert_eq!(got.min.0, 2.0);
        assert!(got.min.1 >= 2.0);
    }

    #[test]
    fn line_cache_rewraps_only_touched_nodes() {
        let measure = MonoMeasure::default();
        let mut cache = LineCache::new();
        let mut wraps = 0;
        for _ in 0..3 {
            cache.lines(7, 0, 80.0, 40.0, || {
                wraps += 1;
                wrap_lines("aa bb cc", 80.0, 40.0, &measure)
            });
        }
        cache.lines(8, 0, 80.0, 40.0, Vec::new);
        assert_eq!(wraps, 1);

        let mut damage = FrameDiff::default();
        damage.repaint.insert(7);
        assert_eq!(cache.invalidate(&damage), 1);
        assert_eq!(cache.len(), 1);
        let lines = cache.lines(7, 0, 80.0, 40.0, || {
            wraps += 1;
            wrap_lines("aa bb cc", 80.0, 40.0, &measure)
        });
        assert!(lines.len() > 1);
        assert_eq!(wraps, 2);
    }

    #[test]
    fn line_cache_rewraps_when_the_width_changes() {
        let mut cache = LineCache::new();
        let mut wraps = 0;
        for width in [80.0, 80.0, 120.0] {
            cache.lines(7, 0, width, 40.0, || {
                wraps += 1;
                Vec::new()
            });
        }
        assert_eq!(wraps, 2);
    }

    #[test]
    fn wrap_breaks_after_spaces() {
        let lines = wrap_lines("hello world", 30.0, 10.0, &MonoMeasure::default());
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["hello ", "world"]);
        assert_eq!(lines[1].global_char_start, 6);
    }

    #[test]
    fn split_lines_tracks_char_offsets() {
        let lines = split_lines("ab\n\ncd");
        assert_eq!(lines, vec![(0, "ab"), (3, ""), (4, "cd")]);
    }
}
