//! Report pipeline: title → canned text → layout → raster pages → PDF file.
//!
//! Everything here is synchronous and CPU-bound. Async callers must run it
//! inside `tokio::task::spawn_blocking`.
//!
//! Output files are named after the request id, never after the title, so
//! concurrent requests with the same title cannot overwrite each other. The
//! title only feeds the human-readable download name.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::content::research_text;
use crate::layout::{layout, Document, LayoutConfig, LayoutError, Metadata};
use crate::render::{
    write_pdf, FontSet, PageRenderer, PageSize, PdfAssembler, PdfError, RenderError, RenderStyle,
};
use crate::shaping::{Font, FontError};

const DOWNLOAD_NAME_CHARS: usize = 20;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Font(#[from] FontError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A PDF written to disk for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub request_id: Uuid,
    pub path: PathBuf,
    /// Display name for the download, derived from the title.
    pub file_name: String,
    pub page_count: usize,
}

impl GeneratedReport {
    /// Reads the PDF back and deletes it from the output directory.
    ///
    /// Front-ends call this once the report is about to be delivered, so
    /// `OUTPUT_DIR` only holds reports still in flight. A failed delete is
    /// logged and does not fail the delivery.
    pub async fn take_bytes(&self) -> std::io::Result<Vec<u8>> {
        let bytes = tokio::fs::read(&self.path).await?;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!(path = %self.path.display(), "failed to remove delivered report: {e}");
        }
        Ok(bytes)
    }
}

/// The seam between front-ends and the pipeline.
///
/// Carried in `AppState` as `Arc<dyn ReportGenerator>`.
pub trait ReportGenerator: Send + Sync {
    /// Lays out the canned report for `metadata.title` without rendering it.
    fn layout(&self, metadata: Metadata) -> Result<Document, PipelineError>;

    /// Generates the report PDF and writes it to `<output_dir>/<request_id>.pdf`.
    fn generate(
        &self,
        request_id: Uuid,
        metadata: Metadata,
    ) -> Result<GeneratedReport, PipelineError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub layout: LayoutConfig,
    pub style: RenderStyle,
    pub page_size: PageSize,
    pub jpeg_quality: u8,
    pub sections: usize,
    pub output_dir: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            layout: LayoutConfig::default(),
            style: RenderStyle::default(),
            page_size: PageSize::A4,
            jpeg_quality: config.jpeg_quality,
            sections: config.report_sections,
            output_dir: config.output_dir.clone(),
        }
    }
}

pub struct ReportPipeline {
    renderer: PageRenderer,
    page_size: PageSize,
    jpeg_quality: u8,
    sections: usize,
    output_dir: PathBuf,
}

impl ReportPipeline {
    /// Validates the layout config and binds fonts. Fails before any request is served.
    pub fn new(settings: PipelineSettings, fonts: &FontSet) -> Result<Self, PipelineError> {
        let renderer = PageRenderer::new(settings.layout, settings.style, fonts)?;
        Ok(Self {
            renderer,
            page_size: settings.page_size,
            jpeg_quality: settings.jpeg_quality,
            sections: settings.sections,
            output_dir: settings.output_dir,
        })
    }

    /// Loads the configured fonts. A missing font file is fatal.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let body = Font::load(&config.font_path)?;
        let header = if config.header_font_path == config.font_path {
            body.clone()
        } else {
            Font::load(&config.header_font_path)?
        };
        Self::new(PipelineSettings::from_config(config), &FontSet { body, header })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders every page of `document` and returns the PDF bytes.
    ///
    /// Pages are rendered and encoded one at a time; only the current raster is held.
    pub fn render_pdf(&self, document: &Document) -> Result<Vec<u8>, PipelineError> {
        let mut assembler = PdfAssembler::new(self.page_size, self.jpeg_quality);
        for page in &document.pages {
            let canvas = self.renderer.render(page, &document.metadata)?;
            assembler.add_page(&canvas)?;
        }
        debug!(pages = assembler.page_count(), "rendered report pages");
        Ok(assembler.finish()?)
    }
}

impl ReportGenerator for ReportPipeline {
    fn layout(&self, metadata: Metadata) -> Result<Document, PipelineError> {
        let text = research_text(&metadata.title, self.sections);
        let document = layout(
            &text,
            metadata,
            self.renderer.config(),
            self.renderer.body_font(),
        )?;
        debug!(
            pages = document.page_count(),
            lines = document.line_count(),
            "report laid out"
        );
        Ok(document)
    }

    fn generate(
        &self,
        request_id: Uuid,
        metadata: Metadata,
    ) -> Result<GeneratedReport, PipelineError> {
        let file_name = download_file_name(&metadata.title);
        let document = self.layout(metadata)?;
        let pdf = self.render_pdf(&document)?;

        let path = self.output_dir.join(format!("{request_id}.pdf"));
        std::fs::create_dir_all(&self.output_dir).map_err(|source| PipelineError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        write_pdf(&path, &pdf)?;

        info!(
            %request_id,
            pages = document.page_count(),
            bytes = pdf.len(),
            path = %path.display(),
            "report generated"
        );

        Ok(GeneratedReport {
            request_id,
            path,
            file_name,
            page_count: document.page_count(),
        })
    }
}

/// Human-readable download name: the first 20 characters of the title with
/// path separators and reserved characters replaced.
pub fn download_file_name(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .take(DOWNLOAD_NAME_CHARS)
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim().trim_matches('.');
    if stem.is_empty() {
        "report.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test doubles
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use image::{Rgb, RgbImage};

    use super::*;
    use crate::layout::document::{Line, Page};
    use crate::render::pdf::assemble_pdf;

    /// Writes a blank two-page PDF per request, or fails every call.
    pub struct StubGenerator {
        pub output_dir: PathBuf,
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl StubGenerator {
        pub fn new(output_dir: impl Into<PathBuf>) -> Self {
            Self {
                output_dir: output_dir.into(),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(std::env::temp_dir())
            }
        }

        fn check(&self) -> Result<(), PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PipelineError::Layout(LayoutError::Measurement(
                    "stub failure".to_string(),
                )));
            }
            Ok(())
        }
    }

    impl ReportGenerator for StubGenerator {
        fn layout(&self, metadata: Metadata) -> Result<Document, PipelineError> {
            self.check()?;
            Ok(Document {
                pages: vec![Page {
                    number: 1,
                    lines: vec![Line {
                        text: metadata.title.clone(),
                        y: 350.0,
                    }],
                }],
                metadata,
            })
        }

        fn generate(
            &self,
            request_id: Uuid,
            metadata: Metadata,
        ) -> Result<GeneratedReport, PipelineError> {
            self.check()?;
            let blank = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
            let path = self.output_dir.join(format!("{request_id}.pdf"));
            write_pdf(&path, &assemble_pdf(&[blank.clone(), blank], PageSize::A4, 90)?)?;
            Ok(GeneratedReport {
                request_id,
                path,
                file_name: download_file_name(&metadata.title),
                page_count: 2,
            })
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
