//! Grid layout, draw-command and interaction engine for user interfaces
//! split between a host renderer and a widget process.
//!
//! The widget process builds a [`tree::Tree`] of nodes on every refresh and
//! answers the host's requests through [`widget::WidgetServer`]. The host
//! ([`host::Host`]) resolves column and row tracks into pixel rectangles,
//! keeps scroll, resize and dialog state in [`settings::Settings`], and
//! turns raw window input into node events with
//! [`interaction::Interaction`]. Drawing happens on the host only, from the
//! primitive buffers the widgets return.

pub mod align;
pub mod bound;
pub mod color;
pub mod commands;
pub mod diff;
pub mod elements;
pub mod env;
pub mod errors;
pub mod host;
pub mod id;
pub mod input;
pub mod interaction;
pub mod jobs;
pub mod layout;
pub mod logging;
pub mod math;
pub mod node;
pub mod prelude;
pub mod protocol;
pub mod render_commands;
#[cfg(feature = "host")]
pub mod renderer;
pub mod resolve;
pub mod scroll;
pub mod settings;
pub mod solver;
pub mod text;
pub mod text_input;
pub mod tree;
pub mod widget;
pub mod widgets;

pub use color::Color;
pub use errors::{Error, Result};
