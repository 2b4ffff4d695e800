//! Report layout: wraps body text into lines and lines into numbered pages.
//!
//! Pure and synchronous. The only external capability is width measurement,
//! injected through `TextMeasure`.

pub mod config;
pub mod document;
pub mod engine;
pub mod measure;

use thiserror::Error;

pub use config::LayoutConfig;
pub use document::{Document, Metadata, Page};
pub use engine::layout;
pub use measure::{MeasureError, TextMeasure};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid layout config: {0}")]
    InvalidConfig(String),

    #[error("width measurement failed: {0}")]
    Measurement(String),
}

impl From<MeasureError> for LayoutError {
    fn from(err: MeasureError) -> Self {
        LayoutError::Measurement(err.to_string())
    }
}
