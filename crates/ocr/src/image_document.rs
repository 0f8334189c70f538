//! Raster image documents (png, jpg, jpeg).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use intake_core::{Document, FileKind, Page, Result};

use crate::engine::OcrEngine;

/// An uploaded image whose text is read by OCR.
pub struct ImageDocument {
    path: PathBuf,
    engine: Arc<dyn OcrEngine>,
}

impl ImageDocument {
    pub fn load(path: &Path, engine: Arc<dyn OcrEngine>) -> Result<Self> {
        if !path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("image not found: {}", path.display()),
            )
            .into());
        }

        Ok(Self {
            path: path.to_path_buf(),
            engine,
        })
    }
}

impl Document for ImageDocument {
    fn kind(&self) -> FileKind {
        FileKind::Image
    }

    fn get_pages(&self) -> Result<Vec<Page>> {
        let text = self.engine.recognize_file(&self.path)?;
        log::debug!(
            "[Image] {} recognized {} chars",
            self.engine.name(),
            text.chars().count()
        );
        Ok(vec![Page::new(1, text)])
    }

    fn get_supported_features(&self) -> Vec<String> {
        vec!["ocr".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use image::{DynamicImage, ImageFormat};

    struct FixedEngine(&'static str);

    impl OcrEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize_image(&self, _img: &DynamicImage) -> std::result::Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_image_text_comes_from_engine() {
        let dir = tempfile::tempdir().unwrap();
        // the upload keeps a random temp name, so the format must be sniffed
        let path = dir.path().join("upload.tmp");
        DynamicImage::new_rgb8(8, 8)
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let doc = ImageDocument::load(&path, Arc::new(FixedEngine("Hello world"))).unwrap();
        assert_eq!(doc.kind(), FileKind::Image);
        assert_eq!(doc.extract_text().unwrap(), "Hello world");
    }

    #[test]
    fn test_undecodable_image_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let doc = ImageDocument::load(&path, Arc::new(FixedEngine("unused"))).unwrap();
        let err = doc.extract_text().unwrap_err();
        assert!(matches!(err, intake_core::CoreError::Extraction(_)));
    }

    #[test]
    fn test_missing_file() {
        let result = ImageDocument::load(Path::new("/no/such/image.png"), Arc::new(FixedEngine("")));
        assert!(result.is_err());
    }
}
