//! OCR shared types

use serde::{Deserialize, Serialize};

pub const DEFAULT_BINARY: &str = "tesseract";
pub const DEFAULT_LANG: &str = "eng";
/// Fully automatic page segmentation, no OSD.
pub const DEFAULT_PSM: u8 = 3;
/// Whatever engine mode the installed traineddata supports.
pub const DEFAULT_OEM: u8 = 3;

/// Tesseract settings. Unset fields fall back to the CLI defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TesseractConfig {
    /// Tesseract executable
    pub binary_path: Option<String>,
    /// tessdata directory, exported as TESSDATA_PREFIX
    pub tessdata_path: Option<String>,
    /// Language(s), e.g. "eng" or "eng+deu"
    pub lang: Option<String>,
    /// Page segmentation mode (0-13)
    pub psm: Option<u8>,
    /// OCR engine mode (0-3)
    pub oem: Option<u8>,
}

impl TesseractConfig {
    pub fn binary_or_default(&self) -> &str {
        self.binary_path.as_deref().unwrap_or(DEFAULT_BINARY)
    }

    pub fn lang_or_default(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn psm_or_default(&self) -> u8 {
        self.psm.unwrap_or(DEFAULT_PSM)
    }

    pub fn oem_or_default(&self) -> u8 {
        self.oem.unwrap_or(DEFAULT_OEM)
    }
}

/// Tesseract installation status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesseractStatus {
    pub installed: bool,
    pub version: Option<String>,
    pub binary_path: Option<String>,
    pub tessdata_path: Option<String>,
    pub available_langs: Vec<String>,
    pub error: Option<String>,
}
