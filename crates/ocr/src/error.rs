//! OCR error types

use intake_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("image processing failed: {0}")]
    ImageProcess(String),

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for OcrError {
    fn from(e: image::ImageError) -> Self {
        OcrError::ImageProcess(e.to_string())
    }
}

impl From<OcrError> for CoreError {
    fn from(e: OcrError) -> Self {
        CoreError::Extraction(e.to_string())
    }
}
