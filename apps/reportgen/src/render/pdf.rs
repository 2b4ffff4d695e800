//! PDF assembly: one JPEG-encoded raster per page, scaled to fill the physical
//! page. Page order follows insertion order.

use std::path::{Path, PathBuf};

use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to encode page {page} as JPEG: {source}")]
    Encode {
        page: usize,
        #[source]
        source: image::ImageError,
    },

    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Physical page size in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    /// ISO A4, 210 × 297 mm.
    pub const A4: PageSize = PageSize {
        width_pt: 595.2756,
        height_pt: 841.8898,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Incrementally builds a PDF so only one raster needs to be alive at a time.
pub struct PdfAssembler {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    page_size: PageSize,
    jpeg_quality: u8,
}

impl PdfAssembler {
    pub fn new(page_size: PageSize, jpeg_quality: u8) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            page_size,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Appends `image` as the next page.
    pub fn add_page(&mut self, image: &RgbImage) -> Result<(), PdfError> {
        let page_number = self.kids.len() + 1;

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality)
            .encode_image(image)
            .map_err(|source| PdfError::Encode {
                page: page_number,
                source,
            })?;

        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width()),
                "Height" => i64::from(image.height()),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let PageSize {
            width_pt,
            height_pt,
        } = self.page_size;

        // Unit square image space scaled to the full page.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width_pt.into(),
                        0.into(),
                        0.into(),
                        height_pt.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.encode()?));

        let media_box: Vec<Object> = vec![0.into(), 0.into(), width_pt.into(), height_pt.into()];
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        });
        self.kids.push(page_id.into());

        debug!(page = page_number, "added PDF page");
        Ok(())
    }

    /// Writes the page tree, catalog and info dictionary and serializes the file.
    pub fn finish(mut self) -> Result<Vec<u8>, PdfError> {
        let count = self.kids.len() as i64;
        let kids = std::mem::take(&mut self.kids);
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal("reportgen"),
            "CreationDate" => Object::string_literal(created),
        });
        self.doc.trailer.set("Info", info_id);

        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }
}

/// Assembles `images` into a PDF, image `i` becoming page `i + 1`.
#[allow(dead_code)]
pub fn assemble_pdf(
    images: &[RgbImage],
    page_size: PageSize,
    jpeg_quality: u8,
) -> Result<Vec<u8>, PdfError> {
    let mut assembler = PdfAssembler::new(page_size, jpeg_quality);
    for image in images {
        assembler.add_page(image)?;
    }
    assembler.finish()
}

/// Writes assembled PDF bytes to `path`.
pub fn write_pdf(path: &Path, bytes: &[u8]) -> Result<(), PdfError> {
    std::fs::write(path, bytes).map_err(|source| PdfError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn blank(width: u32) -> RgbImage {
        RgbImage::from_pixel(width, 40, Rgb([255, 255, 255]))
    }

    fn image_width_on_page(doc: &Document, page_id: ObjectId) -> i64 {
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_ref = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        let stream = doc.get_object(image_ref).unwrap().as_stream().unwrap();
        stream.dict.get(b"Width").unwrap().as_i64().unwrap()
    }

    #[test]
    fn test_one_pdf_page_per_image_in_order() {
        let images = vec![blank(10), blank(20), blank(30)];
        let bytes = assemble_pdf(&images, PageSize::A4, DEFAULT_JPEG_QUALITY).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);
        let widths: Vec<i64> = pages
            .values()
            .map(|id| image_width_on_page(&doc, *id))
            .collect();
        assert_eq!(widths, vec![10, 20, 30]);
    }

    #[test]
    fn test_media_box_is_physical_page_size() {
        let bytes = assemble_pdf(&[blank(8)], PageSize::A4, 80).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let media_box = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((width - 595.2756).abs() < 0.01);
        assert!((height - 841.8898).abs() < 0.01);
    }

    #[test]
    fn test_incremental_assembler_counts_pages() {
        let mut assembler = PdfAssembler::new(PageSize::default(), DEFAULT_JPEG_QUALITY);
        assert_eq!(assembler.page_count(), 0);
        assembler.add_page(&blank(4)).unwrap();
        assembler.add_page(&blank(4)).unwrap();
        assert_eq!(assembler.page_count(), 2);
        let bytes = assembler.finish().unwrap();
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 2);
    }

    #[test]
    fn test_write_pdf_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let bytes = assemble_pdf(&[blank(6)], PageSize::A4, 70).unwrap();
        write_pdf(&path, &bytes).unwrap();
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_write_pdf_to_missing_dir_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.pdf");
        let bytes = assemble_pdf(&[blank(6)], PageSize::A4, 70).unwrap();
        let err = write_pdf(&path, &bytes).unwrap_err();
        assert!(matches!(&err, PdfError::Write { path: p, .. } if *p == path));
        assert!(err.to_string().contains("out.pdf"));
    }
}
