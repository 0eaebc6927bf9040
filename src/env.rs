use serde::{Deserialize, Serialize};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    Eu,
    Us,
    Iso,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Custom,
}

/// Colors a widget reads from the environment instead of hard-coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub primary: Color,
    pub edit: Color,
    pub border: Color,
    pub disabled: Color,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        background: Color::rgb(250, 250, 250),
        text: Color::rgb(30, 30, 30),
        primary: Color::rgb(37, 100, 207),
        edit: Color::rgb(255, 255, 255),
        border: Color::rgb(200, 200, 200),
        disabled: Color::rgb(160, 160, 160),
    };

    pub const DARK: Palette = Palette {
        background: Color::rgb(32, 33, 36),
        text: Color::rgb(232, 234, 237),
        primary: Color::rgb(138, 180, 248),
        edit: Color::rgb(48, 49, 52),
        border: Color::rgb(80, 80, 84),
        disabled: Color::rgb(110, 110, 110),
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palettes {
    pub light: Palette,
    pub dark: Palette,
    pub custom: Palette,
}

impl Default for Palettes {
    fn default() -> Self {
        Self {
            light: Palette::LIGHT,
            dark: Palette::DARK,
            custom: Palette::LIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Microphone {
    pub enable: bool,
    pub sample_rate: u32,
    pub channels: u8,
}

impl Default for Microphone {
    fn default() -> Self {
        Self {
            enable: false,
            sample_rate: 44_100,
            channels: 1,
        }
    }
}

/// Runtime configuration shared between host and widget process.
///
/// The host owns the authoritative copy and pushes it with `SET_ENV`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub date_format: DateFormat,
    pub dpi: i32,
    /// Output volume in `0.0..=1.0`.
    pub volume: f32,
    pub theme: Theme,
    pub palettes: Palettes,
    pub fullscreen: bool,
    pub stats: bool,
    pub microphone: Microphone,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            date_format: DateFormat::default(),
            dpi: 100,
            volume: 0.5,
            theme: Theme::default(),
            palettes: Palettes::default(),
            fullscreen: false,
            stats: false,
            microphone: Microphone::default(),
        }
    }
}

impl Environment {
    pub const MIN_DPI: i32 = 30;
    pub const MAX_DPI: i32 = 400;

    /// Pixel size of one cell.
    pub fn cell_px(&self) -> i32 {
        cell_px(self.dpi)
    }

    pub fn palette(&self) -> &Palette {
        match self.theme {
            Theme::Light => &self.palettes.light,
            Theme::Dark => &self.palettes.dark,
            Theme::Custom => &self.palettes.custom,
        }
    }

    /// Changes the DPI by `steps` of 10%, clamped. Returns true on change.
    pub fn zoom(&mut self, steps: i32) -> bool {
        let before = self.dpi;
        let factor = 1.1f32.powi(steps);
        self.dpi = ((self.dpi as f32 * factor).round() as i32).clamp(Self::MIN_DPI, Self::MAX_DPI);
        self.dpi != before
    }

    /// Clamps out-of-range values received from the peer.
    pub fn sanitize(&mut self) {
        self.dpi = self.dpi.clamp(Self::MIN_DPI, Self::MAX_DPI);
        self.volume = if self.volume.is_nan() { 0.0 } else { self.volume.clamp(0.0, 1.0) };
    }
}

/// `round(dpi / 2.5)`, at least one pixel.
pub fn cell_px(dpi: i32) -> i32 {
    ((dpi as f32 / 2.5).round() as i32).max(1)
}
