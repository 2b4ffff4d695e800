//! Page rendering: paints a laid-out page onto an A4 raster, and assembles
//! rasters into a PDF.
//!
//! Coordinates are raster units with the origin at the top-left corner. Text
//! positions are ascender-anchored: `y` is where the top of the font's ascender
//! sits, not the baseline.

pub mod pdf;

use image::{Rgb, RgbImage};
use thiserror::Error;

use crate::layout::{LayoutConfig, LayoutError, Metadata, Page};
use crate::shaping::{Font, FontError, SizedFont};

pub use pdf::{write_pdf, PageSize, PdfAssembler, PdfError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to shape text: {0}")]
    Shaping(#[from] FontError),
}

// ────────────────────────────────────────────────────────────────────────────
// Style
// ────────────────────────────────────────────────────────────────────────────

/// Fixed positions of the page chrome (header, title, separator, footer).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub header_y: f32,
    pub title_y: f32,
    pub separator_y: u32,
    /// Horizontal inset of the separator from both page edges.
    pub separator_inset: u32,
    pub separator_thickness: u32,
    /// Distance of the page number from the bottom edge.
    pub footer_offset: f32,
    pub ink: Rgb<u8>,
    pub paper: Rgb<u8>,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            header_y: 120.0,
            title_y: 180.0,
            separator_y: 230,
            separator_inset: 200,
            separator_thickness: 2,
            footer_offset: 150.0,
            ink: Rgb([0, 0, 0]),
            paper: Rgb([255, 255, 255]),
        }
    }
}

/// Horizontal anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    Right,
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

/// Fonts used on a page. The footer is set in the body face.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub body: Font,
    pub header: Font,
}

pub struct PageRenderer {
    config: LayoutConfig,
    style: RenderStyle,
    body: SizedFont,
    header: SizedFont,
    footer: SizedFont,
}

impl PageRenderer {
    pub fn new(config: LayoutConfig, style: RenderStyle, fonts: &FontSet) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self {
            body: fonts.body.sized(config.body_font_size),
            header: fonts.header.sized(config.header_font_size),
            footer: fonts.body.sized(config.footer_font_size),
            config,
            style,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The body face at body size; the layout engine must measure with this.
    pub fn body_font(&self) -> &SizedFont {
        &self.body
    }

    /// Paints header, title, separator, body lines and page number.
    pub fn render(&self, page: &Page, metadata: &Metadata) -> Result<RgbImage, RenderError> {
        let width = self.config.page_width.round() as u32;
        let height = self.config.page_height.round() as u32;
        let mut canvas = RgbImage::from_pixel(width, height, self.style.paper);
        let center = self.config.page_width / 2.0;

        self.draw_text(
            &mut canvas,
            &self.header,
            &metadata.header_line(),
            center,
            self.style.header_y,
            Anchor::Center,
        )?;
        self.draw_text(
            &mut canvas,
            &self.header,
            &metadata.title,
            center,
            self.style.title_y,
            Anchor::Center,
        )?;
        self.draw_separator(&mut canvas);

        let right = self.config.page_width - self.config.margin_right;
        for line in &page.lines {
            self.draw_text(&mut canvas, &self.body, &line.text, right, line.y, Anchor::Right)?;
        }

        self.draw_text(
            &mut canvas,
            &self.footer,
            &page.number.to_string(),
            center,
            self.config.page_height - self.style.footer_offset,
            Anchor::Center,
        )?;

        Ok(canvas)
    }

    fn draw_separator(&self, canvas: &mut RgbImage) {
        let (width, height) = canvas.dimensions();
        let start = self.style.separator_inset.min(width);
        let end = width.saturating_sub(self.style.separator_inset);
        let bottom = (self.style.separator_y + self.style.separator_thickness).min(height);
        for y in self.style.separator_y.min(height)..bottom {
            for x in start..end {
                canvas.put_pixel(x, y, self.style.ink);
            }
        }
    }

    /// Draws `text` with its top (ascender line) at `top`, anchored horizontally at `x`.
    fn draw_text(
        &self,
        canvas: &mut RgbImage,
        font: &SizedFont,
        text: &str,
        x: f32,
        top: f32,
        anchor: Anchor,
    ) -> Result<(), RenderError> {
        let line = font.shape(text)?;
        let left = match anchor {
            Anchor::Center => x - line.width / 2.0,
            Anchor::Right => x - line.width,
        };
        let baseline = top + font.ascent();
        let ink = self.style.ink;
        let (width, height) = canvas.dimensions();

        for glyph in &line.glyphs {
            let positioned = font.positioned_glyph(glyph.id, left + glyph.x, baseline + glyph.y);
            let Some(bounds) = positioned.pixel_bounding_box() else {
                continue;
            };
            positioned.draw(|gx, gy, coverage| {
                let px = bounds.min.x + gx as i32;
                let py = bounds.min.y + gy as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                for c in 0..3 {
                    let blended =
                        ink[c] as f32 * coverage + pixel[c] as f32 * (1.0 - coverage);
                    pixel[c] = blended.round() as u8;
                }
            });
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
