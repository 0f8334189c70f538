//! HTTP surface.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use intake_core::{FileKind, Summary};
use intake_ocr::{detect_tesseract_status, TesseractConfig};
use intake_render::PdfiumRasterizer;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::pipeline::Pipeline;

const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    upload_dir: Option<PathBuf>,
    tesseract: TesseractConfig,
}

impl AppState {
    pub fn new(pipeline: Pipeline, config: &AppConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            upload_dir: config.upload_dir.as_ref().map(PathBuf::from),
            tesseract: config.tesseract.clone(),
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/analyze-file/", post(analyze_file))
        .route("/analyze-file", post(analyze_file))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Short content hash identifying an upload in logs.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..6])
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::InvalidUpload(format!(
        "missing multipart field '{}'",
        FILE_FIELD
    )))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge
    } else {
        ApiError::InvalidUpload(e.body_text())
    }
}

async fn analyze_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Summary>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::InvalidUpload(e.body_text()))?;
    let upload = read_upload(&mut multipart).await?;

    let id = fingerprint(&upload.bytes);
    log::info!("[Api] upload {} ({} bytes)", id, upload.bytes.len());

    let pipeline = state.pipeline.clone();
    let upload_dir = state.upload_dir.clone();

    let summary = tokio::task::spawn_blocking(move || -> Result<Summary, ApiError> {
        // the spooled copy is removed when `spooled` drops, on every path
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload_");
        let mut spooled = match &upload_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ApiError::Internal(format!("cannot spool upload: {}", e)))?;
        spooled
            .write_all(&upload.bytes)
            .and_then(|_| spooled.flush())
            .map_err(|e| ApiError::Internal(format!("cannot spool upload: {}", e)))?;

        let kind = FileKind::from_filename(&upload.filename)?;
        Ok(pipeline.analyze(spooled.path(), kind)?)
    })
    .await??;

    log::info!("[Api] upload {} analyzed", id);
    Ok(Json(summary))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tesseract = state.tesseract.clone();
    let (status, pdfium) = tokio::task::spawn_blocking(move || {
        (
            detect_tesseract_status(&tesseract),
            PdfiumRasterizer::is_available(),
        )
    })
    .await?;

    Ok(Json(json!({
        "status": "ok",
        "annotator": state.pipeline.annotator_name(),
        "ocr": status,
        "pdfium": pdfium,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_short_and_stable() {
        let a = fingerprint(b"hello");
        assert_eq!(a.len(), 12);
        assert_eq!(a, fingerprint(b"hello"));
        assert_ne!(a, fingerprint(b"hello!"));
        // sha256("hello") starts with 2cf24dba5fb0
        assert_eq!(a, "2cf24dba5fb0");
    }
}
