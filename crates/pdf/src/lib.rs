//! PDF documents.
//!
//! Text comes from the PDF text layer when there is one. Otherwise every
//! page is rasterized and read by OCR. When neither path works the document
//! yields [`PDF_FALLBACK_TEXT`] instead of an error, so one unreadable PDF
//! never fails a request.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use intake_core::{Document, FileKind, Page, Result};
use intake_ocr::{OcrEngine, OcrError};
use intake_render::{PageRasterizer, RenderError};

/// Text returned when neither the text layer nor OCR produced anything.
pub const PDF_FALLBACK_TEXT: &str = "Could not extract PDF content";

/// Where the text of a [`PdfDocument`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    TextLayer,
    Ocr,
    Placeholder,
}

/// Failures inside one extraction path. These never leave the crate; they
/// only decide which path wins.
#[derive(Error, Debug)]
enum PathError {
    #[error("structure: {0}")]
    Structure(#[from] lopdf::Error),
    #[error("render: {0}")]
    Render(#[from] RenderError),
    #[error("ocr on page {page}: {source}")]
    Ocr { page: u32, source: OcrError },
}

pub struct PdfDocument {
    path: PathBuf,
    ocr: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl PdfDocument {
    pub fn load(
        path: &Path,
        ocr: Arc<dyn OcrEngine>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Result<Self> {
        if !path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("pdf not found: {}", path.display()),
            )
            .into());
        }

        Ok(Self {
            path: path.to_path_buf(),
            ocr,
            rasterizer,
        })
    }

    /// Extracted pages and the path that produced them.
    pub fn extract(&self) -> (Vec<Page>, ExtractionSource) {
        match self.text_layer_pages() {
            Ok(pages) if pages.iter().any(|p| !p.content.trim().is_empty()) => {
                log::info!("[Pdf] text layer found on {} pages", pages.len());
                return (pages, ExtractionSource::TextLayer);
            }
            Ok(_) => log::info!("[Pdf] no text layer, falling back to OCR"),
            Err(e) => log::warn!("[Pdf] structural extraction failed, trying OCR: {}", e),
        }

        match self.ocr_pages() {
            Ok(pages) => {
                log::info!("[Pdf] OCR read {} pages", pages.len());
                (pages, ExtractionSource::Ocr)
            }
            Err(e) => {
                log::warn!("[Pdf] OCR failed, using placeholder: {}", e);
                (
                    vec![Page::new(1, PDF_FALLBACK_TEXT)],
                    ExtractionSource::Placeholder,
                )
            }
        }
    }

    fn text_layer_pages(&self) -> std::result::Result<Vec<Page>, PathError> {
        let doc = lopdf::Document::load(&self.path)?;

        Ok(doc
            .get_pages()
            .keys()
            .map(|&number| {
                // a page whose text cannot be decoded counts as empty
                let content = doc.extract_text(&[number]).unwrap_or_default();
                Page::new(number, content)
            })
            .collect())
    }

    fn ocr_pages(&self) -> std::result::Result<Vec<Page>, PathError> {
        self.rasterizer
            .rasterize(&self.path)?
            .into_iter()
            .map(|rendered| {
                let text = self
                    .ocr
                    .recognize_image(&rendered.image)
                    .map_err(|source| PathError::Ocr {
                        page: rendered.page,
                        source,
                    })?;
                Ok(Page::new(rendered.page, format!("{}\n", text)))
            })
            .collect()
    }
}

impl Document for PdfDocument {
    fn kind(&self) -> FileKind {
        FileKind::Pdf
    }

    fn get_pages(&self) -> Result<Vec<Page>> {
        Ok(self.extract().0)
    }

    /// Page texts are concatenated as-is: text-layer pages carry their own
    /// line breaks and OCR pages already end with one.
    fn extract_text(&self) -> Result<String> {
        Ok(self
            .get_pages()?
            .into_iter()
            .map(|p| p.content)
            .collect::<String>())
    }

    fn get_supported_features(&self) -> Vec<String> {
        vec!["text_extract".to_string(), "ocr".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_ocr::DynamicImage;
    use intake_render::PageImage;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// OCR stub that numbers the pages it reads.
    #[derive(Default)]
    struct CountingOcr {
        calls: AtomicUsize,
        fail: bool,
    }

    impl OcrEngine for CountingOcr {
        fn name(&self) -> &str {
            "counting"
        }

        fn recognize_image(&self, _img: &DynamicImage) -> std::result::Result<String, OcrError> {
            if self.fail {
                return Err(OcrError::Recognition("stub failure".into()));
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("scanned page {}", n))
        }
    }

    struct StubRasterizer {
        pages: u32,
        fail: bool,
    }

    impl PageRasterizer for StubRasterizer {
        fn rasterize(&self, _pdf_path: &Path) -> std::result::Result<Vec<PageImage>, RenderError> {
            if self.fail {
                return Err(RenderError::Unavailable("stub".into()));
            }
            Ok((1..=self.pages)
                .map(|page| PageImage {
                    page,
                    image: DynamicImage::new_rgb8(2, 2),
                })
                .collect())
        }
    }

    /// Writes a single-page PDF; `text` of `None` leaves the page blank.
    fn write_pdf(path: &Path, text: Option<&str>) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = Vec::new();
        if let Some(text) = text {
            operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ];
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn load(path: &Path, ocr: CountingOcr, rasterizer: StubRasterizer) -> PdfDocument {
        PdfDocument::load(path, Arc::new(ocr), Arc::new(rasterizer)).unwrap()
    }

    #[test]
    fn test_text_layer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.pdf");
        write_pdf(&path, Some("Quarterly Report"));

        let doc = load(&path, CountingOcr::default(), StubRasterizer { pages: 1, fail: false });
        let (pages, source) = doc.extract();
        assert_eq!(source, ExtractionSource::TextLayer);
        assert_eq!(pages.len(), 1);
        assert!(doc.extract_text().unwrap().contains("Quarterly Report"));
    }

    #[test]
    fn test_blank_pdf_falls_back_to_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        write_pdf(&path, None);

        let doc = load(&path, CountingOcr::default(), StubRasterizer { pages: 2, fail: false });
        assert_eq!(doc.extract().1, ExtractionSource::Ocr);

        let doc = load(&path, CountingOcr::default(), StubRasterizer { pages: 2, fail: false });
        assert_eq!(doc.extract_text().unwrap(), "scanned page 1\nscanned page 2\n");
    }

    #[test]
    fn test_broken_pdf_still_tries_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 garbage").unwrap();

        let doc = load(&path, CountingOcr::default(), StubRasterizer { pages: 1, fail: false });
        assert_eq!(doc.extract_text().unwrap(), "scanned page 1\n");
    }

    #[test]
    fn test_placeholder_when_everything_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let doc = load(&path, CountingOcr::default(), StubRasterizer { pages: 1, fail: true });
        assert_eq!(doc.extract().1, ExtractionSource::Placeholder);
        assert_eq!(doc.extract_text().unwrap(), PDF_FALLBACK_TEXT);

        let failing_ocr = CountingOcr {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let doc = load(&path, failing_ocr, StubRasterizer { pages: 3, fail: false });
        assert_eq!(doc.extract_text().unwrap(), PDF_FALLBACK_TEXT);
    }

    #[test]
    fn test_zero_rendered_pages_is_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        write_pdf(&path, None);

        let doc = load(&path, CountingOcr::default(), StubRasterizer { pages: 0, fail: false });
        assert_eq!(doc.extract_text().unwrap(), "");
    }

    #[test]
    fn test_missing_file() {
        let result = PdfDocument::load(
            Path::new("/no/such/file.pdf"),
            Arc::new(CountingOcr::default()),
            Arc::new(StubRasterizer { pages: 0, fail: false }),
        );
        assert!(result.is_err());
    }
}
