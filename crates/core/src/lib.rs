//! Core pipeline for document intake.
//!
//! Text extracted from an uploaded file flows through three stages here:
//! redaction ([`rules`]), linguistic annotation ([`annotate`]) and
//! classification ([`summary`]). Format-specific extraction lives in the
//! sibling crates, each implementing [`Document`].

pub mod annotate;
pub mod document;
pub mod rules;
pub mod summary;

pub use annotate::{AnnotatedText, Annotator, EntitySpan, HeuristicAnnotator, Token};
pub use document::{Document, FileKind, Page};
pub use rules::{RedactionReport, Redactor, Rule, RuleHit, RuleSet};
pub use summary::{ContentType, DetectedEntities, SafetyOptions, Summarizer, Summary};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Extension outside png/jpg/jpeg/pdf/txt/docx.
    #[error("Unsupported file type")]
    UnsupportedType(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("utf-8 decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("annotation failed: {0}")]
    Annotation(String),
}

impl CoreError {
    /// Whether the failure is the caller's fault rather than the service's.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::UnsupportedType(_))
    }
}
