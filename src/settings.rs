//! Host-side persisted UI state: scroll positions, resize overrides and the
//! dialog stack, keyed purely by node hash.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Result;
use crate::id::{NodeHash, NO_HASH};
use crate::layout::Axis;
use crate::math::Vec2i;

/// One open dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogEntry {
    pub hash: NodeHash,
    /// Node the dialog is placed relative to, or `NO_HASH`.
    pub parent_hash: NodeHash,
    /// Window point the dialog is anchored at, if opened at a pointer.
    pub touch_anchor: Option<Vec2i>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeEntry {
    pub pos: usize,
    pub size: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(rename = "V_scrolls", default)]
    pub v_scrolls: BTreeMap<NodeHash, i32>,
    #[serde(rename = "H_scrolls", default)]
    pub h_scrolls: BTreeMap<NodeHash, i32>,
    #[serde(rename = "Cols", default)]
    pub cols: BTreeMap<NodeHash, Vec<ResizeEntry>>,
    #[serde(rename = "Rows", default)]
    pub rows: BTreeMap<NodeHash, Vec<ResizeEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "Dialogs", default)]
    pub dialogs: Vec<DialogEntry>,
    #[serde(rename = "Layouts", default)]
    pub layouts: LayoutSettings,
    /// Hashes seen during the current refresh.
    #[serde(skip)]
    used: FxHashSet<NodeHash>,
}

impl Settings {
    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.as_ref().display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Starts a new refresh; every entry is stale until touched again.
    pub fn begin_refresh(&mut self) {
        self.used.clear();
    }

    pub fn touch(&mut self, hash: NodeHash) {
        self.used.insert(hash);
    }

    /// Drops entries whose hash was not touched since `begin_refresh`.
    /// Returns the number of removed entries.
    pub fn maintenance(&mut self) -> usize {
        let used = &self.used;
        let mut removed = 0;
        let mut keep = |hash: &NodeHash| {
            let live = used.contains(hash);
            if !live {
                removed += 1;
            }
            live
        };
        self.layouts.v_scrolls.retain(|h, _| keep(h));
        self.layouts.h_scrolls.retain(|h, _| keep(h));
        self.layouts.cols.retain(|h, _| keep(h));
        self.layouts.rows.retain(|h, _| keep(h));
        if removed > 0 {
            debug!(removed, "dropped stale layout settings");
        }
        removed
    }

    pub fn scroll(&self, hash: NodeHash, axis: Axis) -> i32 {
        let map = match axis {
            Axis::Y => &self.layouts.v_scrolls,
            Axis::X => &self.layouts.h_scrolls,
        };
        map.get(&hash).copied().unwrap_or(0)
    }

    /// Stores a scroll position. Zero positions are not persisted.
    pub fn set_scroll(&mut self, hash: NodeHash, axis: Axis, wheel: i32) {
        let map = match axis {
            Axis::Y => &mut self.layouts.v_scrolls,
            Axis::X => &mut self.layouts.h_scrolls,
        };
        if wheel == 0 {
            map.remove(&hash);
        } else {
            map.insert(hash, wheel);
        }
    }

    fn resizes(&self, axis: Axis) -> &BTreeMap<NodeHash, Vec<ResizeEntry>> {
        match axis {
            Axis::X => &self.layouts.cols,
            Axis::Y => &self.layouts.rows,
        }
    }

    pub fn resize(&self, hash: NodeHash, axis: Axis, pos: usize) -> Option<f32> {
        self.resizes(axis)
            .get(&hash)
            .and_then(|list| list.iter().find(|e| e.pos == pos))
            .map(|e| e.size)
    }

    pub fn set_resize(&mut self, hash: NodeHash, axis: Axis, pos: usize, size: f32) {
        let map = match axis {
            Axis::X => &mut self.layouts.cols,
            Axis::Y => &mut self.layouts.rows,
        };
        let list = map.entry(hash).or_default();
        match list.iter_mut().find(|e| e.pos == pos) {
            Some(entry) => entry.size = size,
            None => {
                list.push(ResizeEntry { pos, size });
                list.sort_by_key(|e| e.pos);
            }
        }
    }

    /// Pushes a dialog, moving it to the top if it is already open.
    pub fn open_dialog(&mut self, hash: NodeHash, parent_hash: NodeHash, touch_anchor: Option<Vec2i>) {
        self.dialogs.retain(|d| d.hash != hash);
        self.dialogs.push(DialogEntry {
            hash,
            parent_hash,
            touch_anchor,
        });
    }

    /// Closes `hash`, or the top dialog for `NO_HASH`. Dialogs opened above
    /// the closed one close with it.
    pub fn close_dialog(&mut self, hash: NodeHash) -> bool {
        if hash == NO_HASH {
            return self.dialogs.pop().is_some();
        }
        match self.dialogs.iter().position(|d| d.hash == hash) {
            Some(i) => {
                self.dialogs.truncate(i);
                true
            }
            None => false,
        }
    }

    pub fn close_all_dialogs(&mut self) {
        self.dialogs.clear();
    }

    pub fn top_dialog(&self) -> Option<&DialogEntry> {
        self.dialogs.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_entries_are_aged_out() {
        let mut s = Settings::default();
        s.set_scroll(10, Axis::Y, 300);
        s.set_scroll(11, Axis::X, 20);
        s.set_resize(12, Axis::X, 1, 5.0);
        s.begin_refresh();
        s.touch(10);
        assert_eq!(s.maintenance(), 2);
        assert_eq!(s.scroll(10, Axis::Y), 300);
        assert_eq!(s.scroll(11, Axis::X), 0);
        assert_eq!(s.resize(12, Axis::X, 1), None);
    }

    #[test]
    fn resize_entries_are_replaced_in_place() {
        let mut s = Settings::default();
        s.set_resize(5, Axis::Y, 2, 1.5);
        s.set_resize(5, Axis::Y, 0, 3.0);
        s.set_resize(5, Axis::Y, 2, 4.0);
        assert_eq!(s.layouts.rows[&5].len(), 2);
        assert_eq!(s.resize(5, Axis::Y, 2), Some(4.0));
        assert_eq!(s.layouts.rows[&5][0].pos, 0);
    }

    #[test]
    fn closing_a_dialog_closes_those_above_it() {
        let mut s = Settings::default();
        s.open_dialog(100, 0, None);
        s.open_dialog(200, 0, None);
        s.open_dialog(300, 0, None);
        assert!(s.close_dialog(200));
        assert_eq!(s.dialogs.len(), 1);
        assert!(!s.close_dialog(999));
        assert!(s.close_dialog(NO_HASH));
        assert!(s.dialogs.is_empty());
    }

    #[test]
    fn reopening_moves_to_top() {
        let mut s = Settings::default();
        s.open_dialog(1000, 0, None);
        s.open_dialog(2000, 0, None);
        s.open_dialog(1000, 5, Some(Vec2i::new(3, 4)));
        assert_eq!(s.dialogs.len(), 2);
        assert_eq!(s.top_dialog().map(|d| d.parent_hash), Some(5));
    }

    #[test]
    fn json_uses_the_documented_keys() {
        let mut s = Settings::default();
        s.set_scroll(42, Axis::Y, 7);
        s.set_resize(42, Axis::X, 1, 5.0);
        s.open_dialog(9, 42, None);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["Layouts"]["V_scrolls"]["42"], 7);
        assert_eq!(json["Layouts"]["Cols"]["42"][0]["size"], 5.0);
        assert_eq!(json["Dialogs"][0]["parent_hash"], 42);
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut s = Settings::default();
        s.set_scroll(77, Axis::X, 120);
        s.save(&path).unwrap();
        let back = Settings::load(&path).unwrap();
        assert_eq!(back.scroll(77, Axis::X), 120);
    }

    #[test]
    fn missing_file_is_default_and_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Settings::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(missing, Settings::default());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(Settings::load(&bad), Err(crate::errors::Error::Settings(_))));
    }
}
