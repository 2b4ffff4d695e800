//! Page geometry for report layout.
//!
//! All values are in raster units (pixels of the target canvas). The default
//! geometry is ISO A4 rasterized at 300 DPI with formal university margins.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Defaults: A4 at 300 DPI
// ────────────────────────────────────────────────────────────────────────────

pub const A4_300DPI_WIDTH: f32 = 2480.0;
pub const A4_300DPI_HEIGHT: f32 = 3508.0;

/// Layout parameters shared by the layout engine and the page renderer.
///
/// The renderer places body lines at the `y` recorded by the layout engine, so
/// both sides must be fed the same value for the height bound to hold on paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_right: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Vertical advance per body line, including the line's own height.
    pub line_spacing: f32,
    pub body_font_size: f32,
    pub header_font_size: f32,
    pub footer_font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: A4_300DPI_WIDTH,
            page_height: A4_300DPI_HEIGHT,
            margin_right: 300.0,
            margin_left: 250.0,
            margin_top: 350.0,
            margin_bottom: 300.0,
            line_spacing: 60.0,
            body_font_size: 42.0,
            header_font_size: 36.0,
            footer_font_size: 34.0,
        }
    }
}

impl LayoutConfig {
    /// Width available to body lines: page width minus left and right margins.
    pub fn usable_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Height available to body lines: page height minus top and bottom margins.
    pub fn usable_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }

    /// The lowest y a line may reach before it overflows the page.
    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    /// Rejects geometry the layout engine cannot make progress with.
    ///
    /// A non-positive usable width would make every candidate line overflow, and a
    /// line spacing taller than the usable height would force a page break before
    /// every line, leaving empty pages behind.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let fields = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("margin_right", self.margin_right),
            ("margin_left", self.margin_left),
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("line_spacing", self.line_spacing),
            ("body_font_size", self.body_font_size),
            ("header_font_size", self.header_font_size),
            ("footer_font_size", self.footer_font_size),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LayoutError::InvalidConfig(format!("{name} must be finite")));
        }

        if self.usable_width() <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "usable width must be positive, got {}",
                self.usable_width()
            )));
        }
        if self.usable_height() <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "usable height must be positive, got {}",
                self.usable_height()
            )));
        }
        if self.line_spacing <= 0.0 || self.line_spacing > self.usable_height() {
            return Err(LayoutError::InvalidConfig(format!(
                "line_spacing must be in (0, {}], got {}",
                self.usable_height(),
                self.line_spacing
            )));
        }
        for (name, size) in [
            ("body_font_size", self.body_font_size),
            ("header_font_size", self.header_font_size),
            ("footer_font_size", self.footer_font_size),
        ] {
            if size <= 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be positive, got {size}"
                )));
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
