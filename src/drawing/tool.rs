//! Drawing tools and their settings.
//!
//! Tool state is independent of the snapshot history: undo never changes
//! the selected tool, color or width.

use crate::constants::{DEFAULT_LINE_WIDTH, DEFAULT_STROKE_COLOR, ERASER_WIDTH_FACTOR};

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Paint with the stroke color
    #[default]
    Pencil,
    /// Remove paint back to the white background
    Eraser,
}

impl Tool {
    /// Portuguese display name.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pencil => "Lápis",
            Tool::Eraser => "Borracha",
        }
    }
}

/// Opaque RGB stroke color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeColor(pub [u8; 3]);

impl Default for StrokeColor {
    fn default() -> Self {
        Self(DEFAULT_STROKE_COLOR)
    }
}

impl StrokeColor {
    /// Parse `#rrggbb` (the `#` is optional). Returns None for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        let [r, g, b] = self.0;
        tiny_skia::Color::from_rgba8(r, g, b, 255)
    }
}

/// Stroke width presets offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineWidth {
    Thin,
    Medium,
    Thick,
}

impl LineWidth {
    /// Width in canvas pixels.
    pub fn pixels(&self) -> f32 {
        match self {
            LineWidth::Thin => 1.0,
            LineWidth::Medium => 2.0,
            LineWidth::Thick => 4.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineWidth::Thin => "Fino",
            LineWidth::Medium => "Médio",
            LineWidth::Thick => "Grosso",
        }
    }

    /// All presets from thinnest to thickest.
    pub fn all() -> &'static [LineWidth] {
        &[LineWidth::Thin, LineWidth::Medium, LineWidth::Thick]
    }
}

/// Current tool settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolState {
    pub tool: Tool,
    pub color: StrokeColor,
    /// Width in canvas pixels
    pub line_width: f32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            color: StrokeColor::default(),
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl ToolState {
    /// Width actually painted; the eraser is wider than the pencil.
    pub fn effective_width(&self) -> f32 {
        match self.tool {
            Tool::Pencil => self.line_width,
            Tool::Eraser => self.line_width * ERASER_WIDTH_FACTOR,
        }
    }

    /// Flip between pencil and eraser.
    pub fn toggle_tool(&mut self) {
        self.tool = match self.tool {
            Tool::Pencil => Tool::Eraser,
            Tool::Eraser => Tool::Pencil,
        };
    }

    pub fn set_preset(&mut self, preset: LineWidth) {
        self.line_width = preset.pixels();
    }
}
