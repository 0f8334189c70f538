//! Redaction rule system.
//!
//! A [`RuleSet`] is an ordered list of regex substitution rules. Order matters:
//! each rule runs on the output of the previous one, so a later rule never
//! sees text an earlier rule already replaced with a placeholder.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::{CoreError, Result};

/// `+` and two or more digits (spaces/hyphens may sit between them), then a
/// run of digits, spaces and hyphens.
pub const PHONE_PATTERN: &str = r"\+\d[\s-]*\d[\s\d-]+";
/// Anything glued around an at-sign.
pub const LOOSE_EMAIL_PATTERN: &str = r"\S+@\S+";
/// Standalone runs of 4+ digits.
pub const LONG_NUMBER_PATTERN: &str = r"\b\d{4,}\b";
/// Local part, `@`, domain, TLD of 2+ letters.
pub const STRICT_EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b";

pub const PHONE_TOKEN: &str = "[PHONE]";
pub const EMAIL_TOKEN: &str = "[EMAIL]";
pub const NUMBERS_TOKEN: &str = "[NUMBERS]";

pub const STRICT_EMAIL_RULE_ID: &str = "email-strict";

/// A single redaction rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Unique identifier
    pub id: String,
    /// Human readable name
    pub name: String,
    pub enabled: bool,
    /// Set on the built-in passes, clear on user-added rules
    #[serde(default)]
    pub is_system: bool,
    /// Regex pattern to search for
    pub pattern: String,
    /// Literal text substituted for every match
    pub replacement: String,
}

impl Rule {
    fn system(id: &str, name: &str, pattern: &str, replacement: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            enabled: true,
            is_system: true,
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Ordered collection of redaction rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The four built-in passes: phone, loose email, long numbers, strict email.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                Rule::system("phone", "Phone number", PHONE_PATTERN, PHONE_TOKEN),
                Rule::system("email", "Email address", LOOSE_EMAIL_PATTERN, EMAIL_TOKEN),
                Rule::system(
                    "long-number",
                    "Long number",
                    LONG_NUMBER_PATTERN,
                    NUMBERS_TOKEN,
                ),
                Rule::system(
                    STRICT_EMAIL_RULE_ID,
                    "Email address (strict)",
                    STRICT_EMAIL_PATTERN,
                    EMAIL_TOKEN,
                ),
            ],
        }
    }

    /// Appends a rule after the existing ones.
    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Enables or disables a rule by id. Returns `false` when the id is unknown.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// All enabled rules, in order.
    pub fn enabled_rules(&self) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.enabled).collect()
    }

    /// Compiles the enabled rules into a [`Redactor`].
    pub fn compile(&self) -> Result<Redactor> {
        let passes = self
            .enabled_rules()
            .into_iter()
            .map(|rule| {
                let regex = Regex::new(&rule.pattern).map_err(|e| {
                    CoreError::InvalidConfig(format!("rule '{}' has a bad pattern: {}", rule.id, e))
                })?;
                Ok(CompiledRule {
                    id: rule.id.clone(),
                    regex,
                    replacement: rule.replacement.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Redactor { passes })
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    id: String,
    regex: Regex,
    replacement: String,
}

/// How many substitutions one rule performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub rule_id: String,
    pub count: usize,
}

/// Redacted text plus the rules that fired on it.
#[derive(Debug, Clone)]
pub struct RedactionReport {
    pub text: String,
    pub hits: Vec<RuleHit>,
}

impl RedactionReport {
    pub fn total_hits(&self) -> usize {
        self.hits.iter().map(|h| h.count).sum()
    }
}

/// Compiled, immutable redactor. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct Redactor {
    passes: Vec<CompiledRule>,
}

impl Redactor {
    /// Redactor for the built-in rule set.
    pub fn builtin() -> Result<Self> {
        RuleSet::builtin().compile()
    }

    /// Number of active passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Applies every pass in order and returns the redacted text.
    pub fn redact(&self, text: &str) -> String {
        self.redact_with_report(text).text
    }

    /// Like [`Redactor::redact`], also counting the matches of each pass.
    pub fn redact_with_report(&self, text: &str) -> RedactionReport {
        let mut result = text.to_string();
        let mut hits = Vec::new();

        for pass in &self.passes {
            let count = pass.regex.find_iter(&result).count();
            if count == 0 {
                continue;
            }
            result = pass
                .regex
                .replace_all(&result, NoExpand(&pass.replacement))
                .into_owned();
            hits.push(RuleHit {
                rule_id: pass.id.clone(),
                count,
            });
        }

        RedactionReport { text: result, hits }
    }
}
