//! Font loading. A missing or unreadable font is an error, never a silent
//! substitution: width measurement is only meaningful against the font that
//! will actually paint the page.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rusttype::{point, GlyphId, PositionedGlyph, Scale};
use tracing::info;

use crate::layout::{MeasureError, TextMeasure};
use crate::shaping::shape::ShapedLine;
use crate::shaping::FontError;

/// A parsed font file, shared cheaply between requests.
#[derive(Clone)]
pub struct Font {
    name: String,
    data: Arc<Vec<u8>>,
    raster: rusttype::Font<'static>,
    units_per_em: f32,
    /// Ascender minus descender, in font units.
    height_units: f32,
    ascent_units: f32,
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("name", &self.name)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl Font {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Self::from_bytes(path.display().to_string(), data)?;
        info!(font = %font.name, "loaded font");
        Ok(font)
    }

    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self, FontError> {
        let name = name.into();
        if rustybuzz::Face::from_slice(&data, 0).is_none() {
            return Err(FontError::Parse(name));
        }
        let raster = rusttype::Font::try_from_vec(data.clone())
            .ok_or_else(|| FontError::Parse(name.clone()))?;

        let units_per_em = f32::from(raster.units_per_em().max(1));
        let v = raster.v_metrics_unscaled();

        Ok(Self {
            name,
            data: Arc::new(data),
            raster,
            units_per_em,
            height_units: v.ascent - v.descent,
            ascent_units: v.ascent,
        })
    }

    /// Binds the font to a size in pixels per em.
    pub fn sized(&self, size_px: f32) -> SizedFont {
        SizedFont {
            font: self.clone(),
            size_px,
        }
    }

    pub(crate) fn face(&self) -> Option<rustybuzz::Face<'_>> {
        rustybuzz::Face::from_slice(&self.data, 0)
    }
}

/// A font at a fixed pixel size: shapes, measures and positions glyphs.
#[derive(Debug, Clone)]
pub struct SizedFont {
    font: Font,
    size_px: f32,
}

impl SizedFont {
    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self) -> f32 {
        self.font.ascent_units * self.size_px / self.font.units_per_em
    }

    pub fn shape(&self, text: &str) -> Result<ShapedLine, FontError> {
        let face = self
            .font
            .face()
            .ok_or_else(|| FontError::Parse(self.font.name.clone()))?;
        Ok(ShapedLine::shape(&face, self.size_px, text))
    }

    /// Positions glyph `id` with its origin (baseline) at `(x, y)`.
    pub fn positioned_glyph(&self, id: u16, x: f32, y: f32) -> PositionedGlyph<'static> {
        self.font
            .raster
            .glyph(GlyphId(id))
            .scaled(self.raster_scale())
            .positioned(point(x, y))
    }

    // rusttype scales by ascender-to-descender height, rustybuzz by em size.
    fn raster_scale(&self) -> Scale {
        Scale::uniform(self.size_px * self.font.height_units / self.font.units_per_em)
    }
}

impl TextMeasure for SizedFont {
    fn measure(&self, text: &str) -> Result<f32, MeasureError> {
        self.shape(text)
            .map(|line| line.width)
            .map_err(|e| MeasureError {
                text: text.to_string(),
                reason: e.to_string(),
            })
    }
}
