//! Rule-driven annotator.
//!
//! Tokenizes with a single regex and recognises two entity kinds:
//! - `DATE`: regex patterns (month names, weekdays, numeric and relative dates)
//! - `ORG`: regex patterns plus suffix matching, where a run of capitalised
//!   words ending in a known suffix ("Acme Corp", "Stanford University") is
//!   taken as an organization
//!
//! All rules come from a JSON model. The default model is embedded at build
//! time; a replacement can be loaded from disk.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::{resolve_overlaps, AnnotatedText, Annotator, EntitySpan, Token, LABEL_DATE, LABEL_ORG};
use crate::{CoreError, Result};

static BUILTIN_MODEL: &str = include_str!("../../data/annotator.json");

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatorModel {
    pub version: String,
    pub token_pattern: String,
    pub date: DateConfig,
    pub organization: OrganizationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateConfig {
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationConfig {
    pub suffixes: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default = "default_min_prefix_words")]
    pub min_prefix_words: usize,
    #[serde(default = "default_max_prefix_words")]
    pub max_prefix_words: usize,
}

fn default_min_prefix_words() -> usize {
    1
}

fn default_max_prefix_words() -> usize {
    4
}

impl AnnotatorModel {
    /// The model embedded in the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_MODEL)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| CoreError::InvalidConfig(format!("annotator model: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

fn compile_patterns(kind: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                CoreError::InvalidConfig(format!("annotator {} pattern '{}': {}", kind, p, e))
            })
        })
        .collect()
}

// ============================================================================
// Annotator
// ============================================================================

/// Heuristic tokenizer and entity matcher.
#[derive(Debug)]
pub struct HeuristicAnnotator {
    version: String,
    token_re: Regex,
    date_patterns: Vec<Regex>,
    org_patterns: Vec<Regex>,
    org_suffixes: HashSet<String>,
    org_min_prefix: usize,
    org_max_prefix: usize,
}

impl HeuristicAnnotator {
    /// Annotator backed by the embedded model.
    pub fn builtin() -> Result<Self> {
        Self::from_model(AnnotatorModel::builtin()?)
    }

    /// Annotator backed by a model file on disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_model(AnnotatorModel::from_file(path)?)
    }

    pub fn from_model(model: AnnotatorModel) -> Result<Self> {
        let org = model.organization;
        if org.min_prefix_words > org.max_prefix_words {
            return Err(CoreError::InvalidConfig(format!(
                "annotator minPrefixWords ({}) exceeds maxPrefixWords ({})",
                org.min_prefix_words, org.max_prefix_words
            )));
        }

        let token_re = Regex::new(&model.token_pattern).map_err(|e| {
            CoreError::InvalidConfig(format!("annotator token pattern: {}", e))
        })?;

        let annotator = Self {
            version: model.version,
            token_re,
            date_patterns: compile_patterns("date", &model.date.patterns)?,
            org_patterns: compile_patterns("organization", &org.patterns)?,
            org_suffixes: org.suffixes.into_iter().collect(),
            org_min_prefix: org.min_prefix_words,
            org_max_prefix: org.max_prefix_words,
        };

        log::info!(
            "[Annotator] model {} loaded: {} date patterns, {} org patterns, {} org suffixes",
            annotator.version,
            annotator.date_patterns.len(),
            annotator.org_patterns.len(),
            annotator.org_suffixes.len()
        );
        Ok(annotator)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Splits text into word and punctuation tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.token_re
            .find_iter(text)
            .map(|m| Token {
                text: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }

    /// Recognises date expressions.
    pub fn match_dates(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        for pattern in &self.date_patterns {
            for m in pattern.find_iter(text) {
                spans.push(span(text, m.start(), m.end(), LABEL_DATE));
            }
        }
        resolve_overlaps(spans)
    }

    /// Recognises organization names.
    pub fn match_organizations(&self, text: &str, tokens: &[Token]) -> Vec<EntitySpan> {
        let mut spans = Vec::new();

        // 1. explicit patterns
        for pattern in &self.org_patterns {
            for m in pattern.find_iter(text) {
                spans.push(span(text, m.start(), m.end(), LABEL_ORG));
            }
        }

        // 2. capitalised words followed by a known suffix
        for (idx, token) in tokens.iter().enumerate() {
            if !self.org_suffixes.contains(token.text.as_str()) {
                continue;
            }

            let mut first = idx;
            let mut prefix_words = 0;
            while first > 0 && prefix_words < self.org_max_prefix {
                let prev = &tokens[first - 1];
                if !is_capitalized(&prev.text) || !same_line_gap(text, prev, &tokens[first]) {
                    break;
                }
                first -= 1;
                prefix_words += 1;
            }

            if prefix_words >= self.org_min_prefix && prefix_words > 0 {
                spans.push(span(text, tokens[first].start, token.end, LABEL_ORG));
            }
        }

        resolve_overlaps(spans)
    }
}

impl Annotator for HeuristicAnnotator {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn annotate(&self, text: &str) -> Result<AnnotatedText> {
        let tokens = self.tokenize(text);

        let mut entities = self.match_dates(text);
        entities.extend(self.match_organizations(text, &tokens));
        let entities = resolve_overlaps(entities);

        log::debug!(
            "[Annotator] {} tokens, {} entities",
            tokens.len(),
            entities.len()
        );

        Ok(AnnotatedText {
            text: text.to_string(),
            tokens,
            entities,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn span(text: &str, start: usize, end: usize, label: &str) -> EntitySpan {
    EntitySpan {
        text: text[start..end].to_string(),
        label: label.to_string(),
        start,
        end,
    }
}

fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '&' | '\'' | '-' | '.'))
        }
        Some('&') => word.len() == 1,
        _ => false,
    }
}

/// Only horizontal whitespace separates the two tokens.
fn same_line_gap(text: &str, left: &Token, right: &Token) -> bool {
    let gap = &text[left.end..right.start];
    gap.chars().all(|c| c.is_whitespace() && c != '\n' && c != '\r')
}
