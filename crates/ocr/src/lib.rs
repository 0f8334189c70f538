//! OCR for document intake.
//!
//! [`OcrEngine`] is the recognition seam; [`TesseractEngine`] drives the
//! tesseract CLI. [`ImageDocument`] plugs an engine into the
//! [`intake_core::Document`] interface for uploaded images.

mod engine;
mod error;
mod image_document;
mod tesseract;
mod types;

pub use engine::OcrEngine;
pub use error::OcrError;
pub use image_document::ImageDocument;
pub use tesseract::{
    detect_tesseract_status, get_tesseract_langs, get_tesseract_version, parse_langs,
    parse_version, TesseractEngine,
};
pub use types::{TesseractConfig, TesseractStatus};

// Re-export so callers can name images without their own `image` dependency
pub use image::DynamicImage;
