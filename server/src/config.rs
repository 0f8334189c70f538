use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use intake_core::SafetyOptions;
use intake_ocr::TesseractConfig;
use intake_render::RenderOptions;
use intake_verify::VerifyOptions;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub const ENV_CONFIG: &str = "INTAKE_CONFIG";
pub const ENV_BIND: &str = "INTAKE_BIND";
pub const ENV_PORT: &str = "INTAKE_PORT";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    // ============ Server ============
    pub bind_address: String,
    pub port: u16,
    /// Where uploads are spooled; the system temp dir when unset
    pub upload_dir: Option<String>,
    pub max_upload_bytes: usize,

    // ============ Extraction ============
    pub tesseract: TesseractConfig,
    pub render: RenderOptions,

    // ============ Analysis ============
    pub redaction: RedactionConfig,
    pub safety: SafetyOptions,
    pub annotator: AnnotatorConfig,
    pub verify: VerifyOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            upload_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            tesseract: TesseractConfig::default(),
            render: RenderOptions::default(),
            redaction: RedactionConfig::default(),
            safety: SafetyOptions::default(),
            annotator: AnnotatorConfig::default(),
            verify: VerifyOptions::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct RedactionConfig {
    /// Run the strict email pass after the loose one
    pub strict_email_pass: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            strict_email_pass: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotatorConfig {
    /// Heuristic model file replacing the embedded one
    pub model_path: Option<String>,
    /// Remote annotation service; takes precedence over `model_path`
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

impl AppConfig {
    /// Reads a JSON config file. No path, or a path that does not exist,
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            log::warn!("[Config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        log::info!("[Config] loaded {}", path.display());
        Ok(config)
    }

    /// Applies `INTAKE_BIND` / `INTAKE_PORT`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(std::env::var(ENV_BIND).ok(), std::env::var(ENV_PORT).ok())
    }

    pub fn apply_overrides(
        &mut self,
        bind: Option<String>,
        port: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(bind) = bind.filter(|b| !b.trim().is_empty()) {
            self.bind_address = bind.trim().to_string();
        }
        if let Some(port) = port {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_PORT,
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert!(config.redaction.strict_email_pass);
        assert!(config.safety.phrase_matching);
        assert_eq!(config.render.dpi, 200);
        assert!(config.annotator.endpoint.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.json");
        fs::write(
            &path,
            r#"{
                "port": 9001,
                "tesseract": { "lang": "eng+deu" },
                "redaction": { "strictEmailPass": false },
                "annotator": { "endpoint": "http://localhost:7000/annotate" }
            }"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.tesseract.lang_or_default(), "eng+deu");
        assert!(!config.redaction.strict_email_pass);
        assert!(config.safety.phrase_matching);
        assert_eq!(config.annotator.timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = AppConfig::load(Some(Path::new("/no/such/intake.json"))).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(AppConfig::load(None).unwrap().port, DEFAULT_PORT);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(Some("0.0.0.0".into()), Some("8080".into()))
            .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");

        config.apply_overrides(Some("  ".into()), None).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");

        let err = config
            .apply_overrides(None, Some("eighty".into()))
            .unwrap_err();
        assert!(err.to_string().contains("INTAKE_PORT"));
    }
}
