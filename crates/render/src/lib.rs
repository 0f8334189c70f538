//! PDF page rasterization.
//!
//! Scanned PDFs carry no text layer, so their pages are rendered to images
//! and handed to OCR. Rendering goes through pdfium, which is loaded at
//! runtime; when the library cannot be found [`RenderError::Unavailable`] is
//! returned and callers fall back.

use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// PDF user space unit, in points per inch.
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("pdfium library unavailable: {0}")]
    Unavailable(String),

    #[error("failed to load PDF: {0}")]
    Load(String),

    #[error("failed to render page {page}: {message}")]
    Render { page: u32, message: String },
}

/// Render options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Dots per inch, default 200
    pub dpi: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { dpi: 200 }
    }
}

/// One rendered page, 1-based.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page: u32,
    pub image: DynamicImage,
}

/// Turns every page of a PDF into an image.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<PageImage>, RenderError>;
}

/// Pixel size of a page of `width_pt` x `height_pt` points at `dpi`.
pub fn target_size(width_pt: f32, height_pt: f32, dpi: u32) -> (i32, i32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    (
        ((width_pt * scale) as i32).max(1),
        ((height_pt * scale) as i32).max(1),
    )
}

/// Directories searched for the pdfium shared library before the system
/// library path.
fn pdfium_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(path) = std::env::var("PDFIUM_LIB_DIR") {
        paths.push(PathBuf::from(path));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            // libs next to the executable, then the executable's directory
            paths.push(exe_dir.join("libs"));
            paths.push(exe_dir.to_path_buf());
        }
    }

    // local development
    paths.push(PathBuf::from("libs"));
    paths.push(PathBuf::from("./"));

    paths
}

fn bind_pdfium() -> Result<Pdfium, RenderError> {
    for path in pdfium_search_paths() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(&path);
        log::debug!("[Render] trying pdfium at {:?}", lib_path);

        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            log::info!("[Render] pdfium loaded from {:?}", path);
            return Ok(Pdfium::new(bindings));
        }
    }

    log::debug!("[Render] trying system pdfium");
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| RenderError::Unavailable(e.to_string()))
}

/// [`PageRasterizer`] backed by pdfium.
///
/// The library is bound on every call so a missing pdfium only disables OCR
/// for PDFs instead of failing startup.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    options: RenderOptions,
}

impl PdfiumRasterizer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Whether pdfium can be loaded on this host.
    pub fn is_available() -> bool {
        bind_pdfium().is_ok()
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<PageImage>, RenderError> {
        let pdfium = bind_pdfium()?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| RenderError::Load(e.to_string()))?;

        let mut images = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let page_number = index as u32 + 1;
            let (width, height) =
                target_size(page.width().value, page.height().value, self.options.dpi);

            log::debug!(
                "[Render] page {}: {}x{} px at {} dpi",
                page_number,
                width,
                height,
                self.options.dpi
            );

            let config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height);

            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| RenderError::Render {
                    page: page_number,
                    message: e.to_string(),
                })?;

            images.push(PageImage {
                page: page_number,
                image: bitmap.as_image(),
            });
        }

        log::info!("[Render] rasterized {} pages", images.len());
        Ok(images)
    }
}
