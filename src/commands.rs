use serde::{Deserialize, Serialize};

use crate::id::{NodeHash, NO_HASH};
use crate::math::Vec2i;

/// Imperative UI requests a widget returns with a `REFRESH` or `INPUT` reply.
///
/// The host applies them in order once the reply is in, before issuing the
/// next request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutCmd {
    VScrollToTop(NodeHash),
    VScrollToBottom(NodeHash),
    HScrollToLeft(NodeHash),
    OpenDialog {
        hash: NodeHash,
        /// Node to open beside, or `NO_HASH`.
        relative_to: NodeHash,
        anchor: Option<Vec2i>,
    },
    /// `NO_HASH` closes the top dialog.
    CloseDialog(NodeHash),
    CloseAllDialogs,
    Copy,
    Cut,
    Paste,
    SelectAll,
    Record,
    SetClipboard(String),
    /// Moves edit focus to the editbox with this hash.
    ActivateEditbox(NodeHash),
    /// Rebuild and restart the widget process.
    Recompile,
    Refresh,
    RefreshDelayed {
        secs: f32,
    },
    Redraw(NodeHash),
}

/// Command queue threaded through build and input callbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Commands {
    list: Vec<LayoutCmd>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: LayoutCmd) {
        self.list.push(cmd);
    }

    pub fn vscroll_to_top(&mut self, hash: NodeHash) {
        self.push(LayoutCmd::VScrollToTop(hash));
    }

    pub fn vscroll_to_bottom(&mut self, hash: NodeHash) {
        self.push(LayoutCmd::VScrollToBottom(hash));
    }

    pub fn hscroll_to_left(&mut self, hash: NodeHash) {
        self.push(LayoutCmd::HScrollToLeft(hash));
    }

    /// Opens a centered dialog.
    pub fn open_dialog(&mut self, hash: NodeHash) {
        self.push(LayoutCmd::OpenDialog {
            hash,
            relative_to: NO_HASH,
            anchor: None,
        });
    }

    /// Opens a dialog below (or above) the node `relative_to`.
    pub fn open_dialog_relative(&mut self, hash: NodeHash, relative_to: NodeHash) {
        self.push(LayoutCmd::OpenDialog {
            hash,
            relative_to,
            anchor: None,
        });
    }

    pub fn open_dialog_at(&mut self, hash: NodeHash, anchor: Vec2i) {
        self.push(LayoutCmd::OpenDialog {
            hash,
            relative_to: NO_HASH,
            anchor: Some(anchor),
        });
    }

    pub fn close_dialog(&mut self, hash: NodeHash) {
        self.push(LayoutCmd::CloseDialog(hash));
    }

    pub fn close_all_dialogs(&mut self) {
        self.push(LayoutCmd::CloseAllDialogs);
    }

    pub fn set_clipboard(&mut self, text: impl Into<String>) {
        self.push(LayoutCmd::SetClipboard(text.into()));
    }

    pub fn activate_editbox(&mut self, hash: NodeHash) {
        self.push(LayoutCmd::ActivateEditbox(hash));
    }

    pub fn refresh(&mut self) {
        self.push(LayoutCmd::Refresh);
    }

    pub fn refresh_delayed(&mut self, secs: f32) {
        self.push(LayoutCmd::RefreshDelayed { secs });
    }

    pub fn redraw(&mut self, hash: NodeHash) {
        self.push(LayoutCmd::Redraw(hash));
    }

    pub fn recompile(&mut self) {
        self.push(LayoutCmd::Recompile);
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutCmd> {
        self.list.iter()
    }

    /// Takes every queued command, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<LayoutCmd> {
        std::mem::take(&mut self.list)
    }
}
