//! Bidi reordering + OpenType shaping of a single line.

use rustybuzz::{Direction, Face, UnicodeBuffer};
use unicode_bidi::BidiInfo;

/// One glyph in visual order. `x` is the pen position from the left edge of the
/// line, `y` the offset from the baseline (positive is down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub id: u16,
    pub x: f32,
    pub y: f32,
}

/// A shaped line: glyphs laid out left to right, plus the total advance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapedLine {
    pub glyphs: Vec<ShapedGlyph>,
    pub width: f32,
}

impl ShapedLine {
    /// Shapes `text` at `size_px` pixels per em.
    ///
    /// Runs are shaped in visual order as resolved by the bidi algorithm, each in
    /// its own direction; the paragraph level is taken from the first strong
    /// character.
    pub fn shape(face: &Face<'_>, size_px: f32, text: &str) -> Self {
        let scale = size_px / face.units_per_em().max(1) as f32;
        let bidi = BidiInfo::new(text, None);

        let mut glyphs = Vec::new();
        let mut pen = 0.0_f32;

        for para in &bidi.paragraphs {
            let (levels, runs) = bidi.visual_runs(para, para.range.clone());
            for run in runs {
                let direction = if levels[run.start].is_rtl() {
                    Direction::RightToLeft
                } else {
                    Direction::LeftToRight
                };

                let mut buffer = UnicodeBuffer::new();
                buffer.push_str(&text[run]);
                buffer.set_direction(direction);
                buffer.guess_segment_properties();

                let output = rustybuzz::shape(face, &[], buffer);
                for (info, pos) in output
                    .glyph_infos()
                    .iter()
                    .zip(output.glyph_positions().iter())
                {
                    glyphs.push(ShapedGlyph {
                        id: info.glyph_id as u16,
                        x: pen + pos.x_offset as f32 * scale,
                        y: -(pos.y_offset as f32) * scale,
                    });
                    pen += pos.x_advance as f32 * scale;
                }
            }
        }

        Self { glyphs, width: pen }
    }
}
