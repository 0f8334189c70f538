//! Classification and summarization of annotated text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::annotate::{AnnotatedText, LABEL_DATE, LABEL_ORG};

/// Keywords that make a document unsafe to publish.
pub const UNSAFE_KEYWORDS: [&str; 6] = [
    "password",
    "ssn",
    "social security",
    "credit card",
    "bank account",
    "confidential",
];

/// Vocabulary for skill extraction (compared lowercase).
pub const SKILL_KEYWORDS: [&str; 8] = [
    "java",
    "python",
    "javascript",
    "html",
    "css",
    "php",
    "developer",
    "software",
];

pub const SAFE_SUMMARY: &str = "This appears to be a professional document";
pub const UNSAFE_SUMMARY: &str = "Document contains sensitive content";
pub const SAFE_PRIVACY_NOTES: &str = "Personal identifiers redacted";
pub const UNSAFE_PRIVACY_NOTES: &str = "Contains sensitive content - do not publish";

/// Document type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "Resume/CV")]
    Resume,
    #[serde(rename = "Legal Document")]
    Legal,
    #[serde(rename = "Report")]
    Report,
    #[serde(rename = "General Document")]
    General,
}

impl ContentType {
    /// Case-insensitive substring classification; the first matching rule wins.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if has(&["resume", "cv"]) {
            ContentType::Resume
        } else if has(&["contract", "agreement"]) {
            ContentType::Legal
        } else if has(&["report", "analysis"]) {
            ContentType::Report
        } else {
            ContentType::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Resume => "Resume/CV",
            ContentType::Legal => "Legal Document",
            ContentType::Report => "Report",
            ContentType::General => "General Document",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities grouped for the response. Sets keep values distinct and the
/// serialized order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedEntities {
    pub skills: BTreeSet<String>,
    pub organizations: BTreeSet<String>,
    pub dates: BTreeSet<String>,
}

/// Final judgment for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub content_summary: String,
    pub content_type: ContentType,
    pub word_count: usize,
    pub detected_entities: DetectedEntities,
    pub is_public_safe: bool,
    pub privacy_notes: String,
}

/// Safety check options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SafetyOptions {
    /// Also match multi-word keywords ("credit card") against consecutive
    /// tokens. When off, only single tokens are compared.
    pub phrase_matching: bool,
}

impl Default for SafetyOptions {
    fn default() -> Self {
        Self {
            phrase_matching: true,
        }
    }
}

/// Turns annotated text into a [`Summary`].
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    options: SafetyOptions,
}

impl Summarizer {
    pub fn new(options: SafetyOptions) -> Self {
        Self { options }
    }

    /// `false` as soon as any unsafe keyword is found.
    pub fn is_public_safe(&self, doc: &AnnotatedText) -> bool {
        let lowered: Vec<String> = doc.tokens.iter().map(|t| t.text.to_lowercase()).collect();

        if lowered
            .iter()
            .any(|token| UNSAFE_KEYWORDS.contains(&token.as_str()))
        {
            return false;
        }

        if self.options.phrase_matching {
            let phrases = UNSAFE_KEYWORDS
                .iter()
                .map(|k| k.split(' ').collect::<Vec<_>>())
                .filter(|words| words.len() > 1);
            for words in phrases {
                if lowered
                    .windows(words.len())
                    .any(|window| window.iter().zip(&words).all(|(t, w)| t == w))
                {
                    return false;
                }
            }
        }

        true
    }

    pub fn summarize(&self, doc: &AnnotatedText) -> Summary {
        let is_public_safe = self.is_public_safe(doc);

        let (content_summary, privacy_notes) = if is_public_safe {
            (SAFE_SUMMARY, SAFE_PRIVACY_NOTES)
        } else {
            (UNSAFE_SUMMARY, UNSAFE_PRIVACY_NOTES)
        };

        Summary {
            content_summary: content_summary.to_string(),
            content_type: ContentType::classify(&doc.text),
            word_count: doc.word_count(),
            detected_entities: DetectedEntities {
                skills: extract_skills(doc),
                organizations: extract_entities(doc, LABEL_ORG),
                dates: extract_entities(doc, LABEL_DATE),
            },
            is_public_safe,
            privacy_notes: privacy_notes.to_string(),
        }
    }
}

/// Distinct token texts, original casing, whose lowercase form is a skill.
pub fn extract_skills(doc: &AnnotatedText) -> BTreeSet<String> {
    doc.tokens
        .iter()
        .filter(|t| SKILL_KEYWORDS.contains(&t.text.to_lowercase().as_str()))
        .map(|t| t.text.clone())
        .collect()
}

/// Distinct entity texts carrying `label`.
pub fn extract_entities(doc: &AnnotatedText, label: &str) -> BTreeSet<String> {
    doc.entities_with_label(label)
        .map(|e| e.text.clone())
        .collect()
}
