//! Width measurement seam between the layout engine and the shaper.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to measure {text:?}: {reason}")]
pub struct MeasureError {
    pub text: String,
    pub reason: String,
}

/// Measures the rendered width of a string, in the same raster units as
/// `LayoutConfig`. Implementations shape the text for display before measuring.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> Result<f32, MeasureError>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(&self, text: &str) -> Result<f32, MeasureError> {
        (**self).measure(text)
    }
}
