//! Everything a widget application needs in one import.
//!
//! ```rust
//! use ply_grid::prelude::*;
//! ```

// Building
pub use crate::tree::{Layout, WidgetCtx};
pub use crate::widget::{run_tcp, WidgetServer};
pub use crate::commands::{Commands, LayoutCmd};
pub use crate::jobs::Job;
pub use crate::bound::{erase, Bound, BoundValue, DynBound};
pub use crate::widgets;

// Drawing
pub use crate::render_commands::{CursorIcon, Paint, TextFlags, TextPrim};
pub use crate::color::{Color, Tint};
pub use crate::math::CellRect;
pub use crate::text::AutoSize;

// Alignment, globbed
pub use crate::align::Align;
pub use crate::align::AlignX::{self, *};
pub use crate::align::AlignY::{self, *};

// Input
pub use crate::input::{DropDirs, DropMove, DropPos, LayoutInput};

pub use crate::env::Environment;
pub use crate::id::NodeHash;
pub use crate::logging::init_logging;
