//! Post-redaction verification.
//!
//! Re-scans redacted text for PII-shaped residue the redaction passes are
//! known to leave behind: digit groups split by separators (each group too
//! short for the long-number pass) and `@handle` fragments with nothing
//! glued before the at-sign. Findings only carry counts, never the matched
//! text, so they are safe to log.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Short digit groups in front of an already redacted run, e.g.
/// `555 123 [NUMBERS]`.
static SPLIT_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{2,}(?:[\s.-]\d{2,})*[\s.-]\[NUMBERS\]").expect("valid split-number pattern")
});

/// Three or more short digit groups, e.g. `12 34 56` or `12.345.678`.
static DIGIT_GROUPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{2,3}(?:[\s.-]\d{2,3}){2,}\b").expect("valid digit-group pattern")
});

/// An at-sign directly followed by a word character.
static HANDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w").expect("valid handle pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidueKind {
    SplitNumber,
    DigitGroups,
    Handle,
}

impl ResidueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResidueKind::SplitNumber => "split_number",
            ResidueKind::DigitGroups => "digit_groups",
            ResidueKind::Handle => "handle",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyOptions {
    /// Look for digit residue
    pub numbers: bool,
    /// Look for `@handle` residue
    pub handles: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            numbers: true,
            handles: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: ResidueKind,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResult {
    pub ok: bool,
    pub findings: Vec<Finding>,
    pub warnings: Vec<String>,
}

/// Scans redacted text for residue.
pub fn verify_text(text: &str, options: &VerifyOptions) -> VerifyResult {
    let mut checks: Vec<(ResidueKind, &Regex)> = Vec::new();
    if options.numbers {
        checks.push((ResidueKind::SplitNumber, &*SPLIT_NUMBER));
        checks.push((ResidueKind::DigitGroups, &*DIGIT_GROUPS));
    }
    if options.handles {
        checks.push((ResidueKind::Handle, &*HANDLE));
    }

    let findings: Vec<Finding> = checks
        .into_iter()
        .filter_map(|(kind, re)| {
            let count = re.find_iter(text).count();
            (count > 0).then_some(Finding { kind, count })
        })
        .collect();

    let warnings = findings
        .iter()
        .map(|f| format!("{} possible {} residue", f.count, f.kind.as_str()))
        .collect();

    VerifyResult {
        ok: findings.is_empty(),
        findings,
        warnings,
    }
}
