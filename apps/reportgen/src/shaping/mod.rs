//! Text shaping backed by rustybuzz (OpenType shaping), unicode-bidi (visual
//! reordering) and rusttype (glyph rasterization).
//!
//! Arabic needs both steps: contextual joining forms come from shaping, and
//! right-to-left runs mixed with digits or Latin need bidi reordering before the
//! glyphs can be laid out left to right on the canvas.

pub mod font;
pub mod shape;

use std::path::PathBuf;

use thiserror::Error;

pub use font::{Font, SizedFont};

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a usable TrueType/OpenType font")]
    Parse(String),
}

/// Locates a system font for tests that need real glyph metrics.
///
/// `REPORTGEN_TEST_FONT` wins over the usual DejaVu install locations. Tests that
/// get `None` skip their font-dependent assertions.
#[cfg(test)]
pub(crate) fn find_test_font() -> Option<Font> {
    let candidates = std::env::var("REPORTGEN_TEST_FONT")
        .ok()
        .into_iter()
        .chain(
            [
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/TTF/DejaVuSans.ttf",
                "/Library/Fonts/Arial Unicode.ttf",
            ]
            .into_iter()
            .map(String::from),
        );
    for path in candidates {
        if let Ok(font) = Font::load(&path) {
            return Some(font);
        }
    }
    eprintln!("no test font found; set REPORTGEN_TEST_FONT to run font-dependent tests");
    None
}
