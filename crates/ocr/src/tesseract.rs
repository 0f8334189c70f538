//! Tesseract OCR engine (CLI wrapper)

use image::{DynamicImage, ImageFormat};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::types::{TesseractConfig, TesseractStatus};

/// Tesseract OCR engine
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    config: TesseractConfig,
    version: Option<String>,
}

impl TesseractEngine {
    /// Creates an engine after checking the binary answers `--version`.
    pub fn new(config: TesseractConfig) -> Result<Self, OcrError> {
        let version = get_tesseract_version(config.binary_or_default())?;

        log::info!("[Tesseract] ready, version: {}", version);

        Ok(Self {
            config,
            version: Some(version),
        })
    }

    /// Creates an engine without probing the binary. Failures surface on the
    /// first recognition instead.
    pub fn with_config(config: TesseractConfig) -> Self {
        Self {
            config,
            version: None,
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(self.config.binary_or_default());
        if let Some(tessdata_path) = &self.config.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata_path);
        }
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize_image(&self, img: &DynamicImage) -> Result<String, OcrError> {
        let temp_input = tempfile::Builder::new()
            .prefix("tesseract_input_")
            .suffix(".png")
            .tempfile()?;

        img.save_with_format(temp_input.path(), ImageFormat::Png)
            .map_err(|e| OcrError::ImageProcess(format!("failed to write scratch image: {}", e)))?;

        // the scratch file is removed when `temp_input` drops
        self.recognize_file(temp_input.path())
    }

    fn recognize_file(&self, image_path: &Path) -> Result<String, OcrError> {
        let start = Instant::now();

        let mut cmd = self.command();
        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(self.config.lang_or_default())
            .arg("--psm")
            .arg(self.config.psm_or_default().to_string())
            .arg("--oem")
            .arg(self.config.oem_or_default().to_string());

        log::debug!(
            "[Tesseract] run: {} <image> stdout -l {} --psm {} --oem {}",
            self.config.binary_or_default(),
            self.config.lang_or_default(),
            self.config.psm_or_default(),
            self.config.oem_or_default()
        );

        let output = cmd
            .output()
            .map_err(|e| OcrError::Unavailable(format!("failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = clean_output(&String::from_utf8_lossy(&output.stdout));

        log::info!(
            "[Tesseract] done in {} ms, {} chars",
            start.elapsed().as_millis(),
            text.chars().count()
        );

        Ok(text)
    }
}

/// Drops the page-separator form feed tesseract appends to stdout output.
fn clean_output(raw: &str) -> String {
    raw.trim_end_matches(|c: char| c == '\x0c' || c == '\n')
        .to_string()
}

/// Pulls the version number out of `tesseract --version` output.
///
/// The first line reads `tesseract 5.3.0` or `tesseract v5.3.0`.
pub fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.contains("tesseract"))
        .find_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            (parts.len() >= 2).then(|| parts[1].trim_start_matches('v').to_string())
        })
}

/// Pulls language codes out of `tesseract --list-langs` output.
pub fn parse_langs(output: &str) -> Vec<String> {
    let mut langs = Vec::new();
    let mut found_list = false;

    for line in output.lines() {
        let line = line.trim();
        if line.contains("List of available languages") || line.contains("traineddata") {
            found_list = true;
            continue;
        }
        if found_list && !line.is_empty() && !line.contains(':') {
            langs.push(line.to_string());
        }
    }

    langs
}

/// Tesseract version reported by `binary_path`.
pub fn get_tesseract_version(binary_path: &str) -> Result<String, OcrError> {
    let output = Command::new(binary_path)
        .arg("--version")
        .output()
        .map_err(|e| OcrError::Unavailable(format!("cannot run {}: {}", binary_path, e)))?;

    if !output.status.success() {
        return Err(OcrError::Unavailable(format!(
            "{} --version failed",
            binary_path
        )));
    }

    // older releases print the banner to stderr
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    Ok(parse_version(&combined).unwrap_or_else(|| "unknown".to_string()))
}

/// Languages available to `binary_path`.
pub fn get_tesseract_langs(
    binary_path: &str,
    tessdata_path: Option<&str>,
) -> Result<Vec<String>, OcrError> {
    let mut cmd = Command::new(binary_path);
    cmd.arg("--list-langs");

    if let Some(path) = tessdata_path {
        cmd.env("TESSDATA_PREFIX", path);
    }

    let output = cmd
        .output()
        .map_err(|e| OcrError::Unavailable(format!("cannot run {}: {}", binary_path, e)))?;

    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    Ok(parse_langs(&combined))
}

/// Probes the configured binary, then whatever `tesseract` is on PATH.
pub fn detect_tesseract_status(config: &TesseractConfig) -> TesseractStatus {
    let configured = config.binary_or_default();

    let mut candidates = vec![configured.to_string()];
    if let Some(found) = which_tesseract("tesseract") {
        if found != configured {
            candidates.push(found);
        }
    }

    for binary in &candidates {
        let Ok(version) = get_tesseract_version(binary) else {
            continue;
        };
        let langs = get_tesseract_langs(binary, config.tessdata_path.as_deref()).unwrap_or_default();
        let tessdata = config
            .tessdata_path
            .clone()
            .or_else(|| find_tessdata_path(binary));

        return TesseractStatus {
            installed: true,
            version: Some(version),
            binary_path: which_tesseract(binary).or_else(|| Some(binary.clone())),
            tessdata_path: tessdata,
            available_langs: langs,
            error: None,
        };
    }

    TesseractStatus {
        installed: false,
        version: None,
        binary_path: None,
        tessdata_path: None,
        available_langs: Vec::new(),
        error: Some("tesseract not found; install it or set tesseract.binaryPath".to_string()),
    }
}

/// Full path of a tesseract executable.
fn which_tesseract(binary: &str) -> Option<String> {
    if Path::new(binary).is_absolute() {
        return Path::new(binary).exists().then(|| binary.to_string());
    }

    #[cfg(target_os = "windows")]
    let lookup = "where";
    #[cfg(not(target_os = "windows"))]
    let lookup = "which";

    Command::new(lookup)
        .arg(binary)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
        })
        .filter(|s| !s.is_empty())
}

/// Best guess at the tessdata directory.
fn find_tessdata_path(binary_path: &str) -> Option<String> {
    if let Ok(path) = std::env::var("TESSDATA_PREFIX") {
        if Path::new(&path).exists() {
            return Some(path);
        }
    }

    let output = Command::new(binary_path)
        .arg("--print-parameters")
        .output()
        .ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines().filter(|l| l.contains("tessdata")) {
        if let Some(path) = line.split_whitespace().last() {
            let path = path.trim_matches('"');
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    let common_paths = [
        "C:\\Program Files\\Tesseract-OCR\\tessdata",
        "C:\\Program Files (x86)\\Tesseract-OCR\\tessdata",
    ];

    #[cfg(not(target_os = "windows"))]
    let common_paths = [
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
        "/opt/homebrew/share/tessdata",
    ];

    common_paths
        .iter()
        .find(|p| Path::new(p).exists())
        .map(|p| p.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        let out = "tesseract 5.3.0\n leptonica-1.82.0\n  libgif 5.1.9";
        assert_eq!(parse_version(out).as_deref(), Some("5.3.0"));
        assert_eq!(parse_version("tesseract v4.1.1").as_deref(), Some("4.1.1"));
        assert_eq!(parse_version("leptonica-1.82.0"), None);
    }

    #[test]
    fn test_parse_langs() {
        let out = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nosd\ndeu\n";
        assert_eq!(parse_langs(out), vec!["eng", "osd", "deu"]);
        assert!(parse_langs("").is_empty());
    }

    #[test]
    fn test_clean_output_strips_form_feed() {
        assert_eq!(clean_output("Hello world\n\x0c"), "Hello world");
        assert_eq!(clean_output("line one\nline two\n"), "line one\nline two");
        assert_eq!(clean_output("\x0c"), "");
    }

    #[test]
    fn test_config_defaults() {
        let config = TesseractConfig::default();
        assert_eq!(config.binary_or_default(), "tesseract");
        assert_eq!(config.lang_or_default(), "eng");
        assert_eq!(config.psm_or_default(), 3);
        assert_eq!(config.oem_or_default(), 3);

        let config: TesseractConfig =
            serde_json::from_str(r#"{"lang":"deu","tessdataPath":"/opt/td"}"#).unwrap();
        assert_eq!(config.lang_or_default(), "deu");
        assert_eq!(config.tessdata_path.as_deref(), Some("/opt/td"));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let engine = TesseractEngine::new(TesseractConfig {
            binary_path: Some("/nonexistent/tesseract-binary".into()),
            ..Default::default()
        });
        assert!(matches!(engine, Err(OcrError::Unavailable(_))));

        let status = detect_tesseract_status(&TesseractConfig {
            binary_path: Some("/nonexistent/tesseract-binary".into()),
            ..Default::default()
        });
        if !status.installed {
            assert!(status.error.is_some());
        }
    }

    #[test]
    fn test_recognize_with_missing_binary_fails() {
        let engine = TesseractEngine::with_config(TesseractConfig {
            binary_path: Some("/nonexistent/tesseract-binary".into()),
            ..Default::default()
        });
        assert!(engine.version().is_none());
        let img = DynamicImage::new_rgb8(4, 4);
        assert!(engine.recognize_image(&img).is_err());
    }
}
