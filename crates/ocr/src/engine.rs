//! OCR engine trait

use image::{DynamicImage, ImageReader};
use std::path::Path;

use crate::error::OcrError;

/// Text recognition capability.
///
/// Engines are shared between concurrent requests, so recognition takes
/// `&self`.
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Recognizes the text in a decoded image.
    fn recognize_image(&self, img: &DynamicImage) -> Result<String, OcrError>;

    /// Recognizes the text in an image file. The format is sniffed from the
    /// content, not the file name.
    fn recognize_file(&self, image_path: &Path) -> Result<String, OcrError> {
        let img = ImageReader::open(image_path)?
            .with_guessed_format()?
            .decode()?;
        self.recognize_image(&img)
    }
}
