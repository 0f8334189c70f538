//! Extraction → redaction → annotation → summary.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use intake_core::rules::STRICT_EMAIL_RULE_ID;
use intake_core::{
    Annotator, Document, FileKind, HeuristicAnnotator, Redactor, Result, RuleSet, Summarizer,
    Summary,
};
use intake_docx::DocxDocument;
use intake_ocr::{ImageDocument, OcrEngine, TesseractEngine};
use intake_pdf::PdfDocument;
use intake_render::{PageRasterizer, PdfiumRasterizer};
use intake_text::TextDocument;
use intake_verify::{verify_text, VerifyOptions};

use crate::config::AppConfig;
use crate::nlp::RemoteAnnotator;

/// Engines and rules shared by every request. Built once, read-only after.
pub struct Pipeline {
    ocr: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
    redactor: Redactor,
    annotator: Arc<dyn Annotator>,
    summarizer: Summarizer,
    verify: VerifyOptions,
}

impl Pipeline {
    /// Pipeline with the built-in redaction rules and default safety options.
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        rasterizer: Arc<dyn PageRasterizer>,
        annotator: Arc<dyn Annotator>,
    ) -> Result<Self> {
        Ok(Self {
            ocr,
            rasterizer,
            redactor: Redactor::builtin()?,
            annotator,
            summarizer: Summarizer::default(),
            verify: VerifyOptions::default(),
        })
    }

    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn with_summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn with_verify_options(mut self, verify: VerifyOptions) -> Self {
        self.verify = verify;
        self
    }

    /// Builds the production pipeline.
    ///
    /// Must be called inside a tokio runtime when a remote annotator is
    /// configured.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let ocr: Arc<dyn OcrEngine> = match TesseractEngine::new(config.tesseract.clone()) {
            Ok(engine) => Arc::new(engine),
            Err(e) => {
                log::warn!("[Pipeline] {}; image and scanned PDF uploads will fail", e);
                Arc::new(TesseractEngine::with_config(config.tesseract.clone()))
            }
        };

        let rasterizer = Arc::new(PdfiumRasterizer::new(config.render));

        let annotator: Arc<dyn Annotator> = if let Some(endpoint) = &config.annotator.endpoint {
            Arc::new(RemoteAnnotator::new(
                endpoint,
                Duration::from_secs(config.annotator.timeout_secs),
                tokio::runtime::Handle::try_current()
                    .context("remote annotator needs a tokio runtime")?,
            )?)
        } else if let Some(model_path) = &config.annotator.model_path {
            Arc::new(
                HeuristicAnnotator::from_file(Path::new(model_path))
                    .with_context(|| format!("loading annotator model {}", model_path))?,
            )
        } else {
            Arc::new(HeuristicAnnotator::builtin()?)
        };

        let mut rules = RuleSet::builtin();
        rules.set_enabled(STRICT_EMAIL_RULE_ID, config.redaction.strict_email_pass);
        let redactor = rules.compile()?;

        log::info!(
            "[Pipeline] ready: ocr={}, annotator={}, {} redaction passes",
            ocr.name(),
            annotator.name(),
            redactor.pass_count()
        );

        Ok(Self::new(ocr, rasterizer, annotator)?
            .with_redactor(redactor)
            .with_summarizer(Summarizer::new(config.safety))
            .with_verify_options(config.verify.clone()))
    }

    pub fn annotator_name(&self) -> &str {
        self.annotator.name()
    }

    /// Opens `path` with the handler for `kind`.
    pub fn load_document(&self, path: &Path, kind: FileKind) -> Result<Box<dyn Document>> {
        let doc: Box<dyn Document> = match kind {
            FileKind::Image => Box::new(ImageDocument::load(path, self.ocr.clone())?),
            FileKind::Pdf => Box::new(PdfDocument::load(
                path,
                self.ocr.clone(),
                self.rasterizer.clone(),
            )?),
            FileKind::Text => Box::new(TextDocument::load(path)?),
            FileKind::Docx => Box::new(DocxDocument::load(path)?),
        };
        Ok(doc)
    }

    /// Best-effort text of the file.
    pub fn extract(&self, path: &Path, kind: FileKind) -> Result<String> {
        let doc = self.load_document(path, kind)?;
        let text = doc.extract_text()?;
        log::info!(
            "[Pipeline] extracted {} chars from {} upload",
            text.chars().count(),
            kind
        );
        Ok(text)
    }

    /// Redacts, annotates and summarizes already extracted text.
    pub fn summarize_text(&self, text: &str) -> Result<Summary> {
        let report = self.redactor.redact_with_report(text);
        for hit in &report.hits {
            log::info!("[Pipeline] redaction rule {} fired {} times", hit.rule_id, hit.count);
        }

        let verification = verify_text(&report.text, &self.verify);
        for warning in &verification.warnings {
            log::warn!("[Pipeline] {}", warning);
        }

        let annotated = self.annotator.annotate(&report.text)?;
        Ok(self.summarizer.summarize(&annotated))
    }

    /// Runs the whole pipeline on one uploaded file.
    pub fn analyze(&self, path: &Path, kind: FileKind) -> Result<Summary> {
        let text = self.extract(path, kind)?;
        let summary = self.summarize_text(&text)?;
        log::info!(
            "[Pipeline] {} upload: {} ({} words, public_safe={})",
            kind,
            summary.content_type,
            summary.word_count,
            summary.is_public_safe
        );
        Ok(summary)
    }
}
