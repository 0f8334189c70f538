//! Linguistic annotation.
//!
//! The pipeline treats tokenization and entity recognition as an external
//! capability behind [`Annotator`]. [`HeuristicAnnotator`] is the built-in
//! implementation; other crates can plug in remote or model-backed ones.

mod heuristics;

pub use heuristics::{AnnotatorModel, DateConfig, HeuristicAnnotator, OrganizationConfig};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Entity label for organizations.
pub const LABEL_ORG: &str = "ORG";
/// Entity label for dates and date-like expressions.
pub const LABEL_DATE: &str = "DATE";

/// Smallest unit produced by tokenization: a word or a punctuation mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Byte offset of the first character
    #[serde(default)]
    pub start: usize,
    /// Byte offset one past the last character
    #[serde(default)]
    pub end: usize,
}

/// A labeled run of text. Labels are an open vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
}

/// Redacted text together with its tokens and entity spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedText {
    pub text: String,
    pub tokens: Vec<Token>,
    pub entities: Vec<EntitySpan>,
}

impl AnnotatedText {
    /// Entity spans carrying `label`, in document order.
    pub fn entities_with_label<'a>(
        &'a self,
        label: &'a str,
    ) -> impl Iterator<Item = &'a EntitySpan> + 'a {
        self.entities.iter().filter(move |e| e.label == label)
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Tokenization + named-entity recognition capability.
///
/// Implementations are built once and shared read-only between concurrent
/// requests.
pub trait Annotator: Send + Sync {
    /// Short identifier used in logs and health output.
    fn name(&self) -> &str;

    /// Produces tokens and entity spans for `text`.
    fn annotate(&self, text: &str) -> Result<AnnotatedText>;
}

/// Sorts spans by position and drops any span that overlaps an earlier,
/// longer-or-equal one.
pub(crate) fn resolve_overlaps(mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then((b.end - b.start).cmp(&(a.end - a.start))));

    let mut kept: Vec<EntitySpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match kept.last() {
            Some(prev) if span.start < prev.end => continue,
            _ => kept.push(span),
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, label: &str, start: usize, end: usize) -> EntitySpan {
        EntitySpan {
            text: text.into(),
            label: label.into(),
            start,
            end,
        }
    }

    #[test]
    fn test_resolve_overlaps_keeps_longest_at_same_start() {
        let spans = vec![
            span("Acme", LABEL_ORG, 10, 14),
            span("Acme Corp", LABEL_ORG, 10, 19),
            span("March", LABEL_DATE, 0, 5),
            span("Corp", LABEL_ORG, 15, 19),
        ];
        let kept = resolve_overlaps(spans);
        let texts: Vec<&str> = kept.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["March", "Acme Corp"]);
    }

    #[test]
    fn test_entities_with_label() {
        let doc = AnnotatedText {
            text: String::new(),
            tokens: Vec::new(),
            entities: vec![
                span("Acme Corp", LABEL_ORG, 0, 9),
                span("May", LABEL_DATE, 10, 13),
                span("Globex Inc", LABEL_ORG, 14, 24),
            ],
        };
        let orgs: Vec<&str> = doc
            .entities_with_label(LABEL_ORG)
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(orgs, vec!["Acme Corp", "Globex Inc"]);
        assert_eq!(doc.entities_with_label("PERSON").count(), 0);
    }
}
