//! Plain text documents.
//!
//! Implements [`Document`] for `.txt` uploads. Content must be valid UTF-8;
//! anything else is a decode error rather than lossy text.

use intake_core::{Document, FileKind, Page, Result};
use std::fs;
use std::path::Path;

/// Plain text document. The whole file is a single page.
pub struct TextDocument {
    content: String,
}

impl TextDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let content = String::from_utf8(bytes)?;

        log::debug!("[Text] loaded {} bytes", content.len());

        Ok(Self { content })
    }
}

impl Document for TextDocument {
    fn kind(&self) -> FileKind {
        FileKind::Text
    }

    fn get_pages(&self) -> Result<Vec<Page>> {
        Ok(vec![Page::new(1, self.content.clone())])
    }

    fn extract_text(&self) -> Result<String> {
        Ok(self.content.clone())
    }

    fn get_supported_features(&self) -> Vec<String> {
        vec!["text_extract".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::CoreError;

    #[test]
    fn test_reads_utf8_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "Café menu\r\nline two\n").unwrap();

        let doc = TextDocument::load(&path).unwrap();
        assert_eq!(doc.kind(), FileKind::Text);
        assert_eq!(doc.extract_text().unwrap(), "Café menu\r\nline two\n");
        assert_eq!(doc.get_pages().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();
        assert_eq!(TextDocument::load(&path).unwrap().extract_text().unwrap(), "");
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [b'c', b'a', b'f', 0xe9]).unwrap();

        let err = TextDocument::load(&path).err().unwrap();
        assert!(matches!(err, CoreError::Decode(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TextDocument::load(Path::new("/no/such/notes.txt")).err().unwrap();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
