//! Unified document interface.
//!
//! Every format handler implements [`Document`] so the pipeline can pull text
//! out of an upload without knowing how the format stores it. Handlers are
//! built through their own `load` constructors because some of them need
//! external engines (OCR, rasterizer) in addition to the file path.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A page of extracted text.
///
/// Formats without pagination (plain text, word documents) expose their whole
/// content as page 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub page_number: u32,
    pub content: String,
}

impl Page {
    pub fn new(page_number: u32, content: impl Into<String>) -> Self {
        Self {
            page_number,
            content: content.into(),
        }
    }
}

/// Declared kind of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Text,
    Docx,
}

impl FileKind {
    /// Maps a (case-insensitive) extension to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => Some(FileKind::Image),
            "pdf" => Some(FileKind::Pdf),
            "txt" => Some(FileKind::Text),
            "docx" => Some(FileKind::Docx),
            _ => None,
        }
    }

    /// Determines the kind from an uploaded filename.
    ///
    /// Only the substring after the last `.` counts. A name without any dot is
    /// treated as a bare extension, so `"pdf"` resolves to [`FileKind::Pdf`].
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = filename.rsplit('.').next().unwrap_or(filename);
        Self::from_extension(ext).ok_or_else(|| CoreError::UnsupportedType(ext.to_lowercase()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
            FileKind::Text => "text",
            FileKind::Docx => "docx",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified document interface.
pub trait Document: Send + Sync {
    /// The kind this handler serves.
    fn kind(&self) -> FileKind;

    /// Extracted text, organised by page.
    fn get_pages(&self) -> Result<Vec<Page>>;

    /// The single best-effort text string for the whole document.
    ///
    /// Defaults to the pages joined by newlines; handlers with their own
    /// joining rules override it.
    fn extract_text(&self) -> Result<String> {
        let pages = self.get_pages()?;
        Ok(pages
            .into_iter()
            .map(|p| p.content)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Capabilities of this handler, e.g. `text_extract`, `ocr`.
    fn get_supported_features(&self) -> Vec<String>;
}
