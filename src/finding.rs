//! Core data types for rule findings.
//!
//! This module contains the primary output types of the rule pipeline:
//!
//! - [`Finding`] — a single issue detected by a [rule](crate::rules).
//! - [`Severity`], [`Confidence`] — ordered classification enums.
//! - [`FindingKey`] — a baseline-stable fingerprint for a finding.
//!
//! Findings are immutable once produced: severity is assigned from
//! [`Config`](crate::config::Config) at rule-evaluation time and never
//! set directly by a rule.

use std::collections::BTreeSet;
use std::fmt;

/// Severity level for a finding, ordered from least to most urgent.
///
/// Implements [`Ord`] so findings and gate thresholds can be compared
/// directly (`finding.severity >= config.ci.fail_on`).
///
/// Serializes to lowercase strings (`"critical"`, `"high"`, `"med"`, `"low"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Lowest urgency; advisory only.
    Low,
    /// Notable risk, not usually production-blocking on its own.
    Med,
    /// Should be fixed before shipping.
    High,
    /// Exploitable in production as-is.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Med => write!(f, "med"),
            Severity::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "med" | "medium" => Ok(Severity::Med),
            "low" => Ok(Severity::Low),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// Confidence level for a finding, ordered from least to most certain.
///
/// Findings below [`CiConfig::min_confidence`](crate::config::CiConfig) are
/// advisory: still reported, but they do not participate in the CI gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" | "med" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            other => Err(format!("unknown confidence: {other}")),
        }
    }
}

/// A single finding produced by a [rule](crate::rules::Rule).
///
/// Immutable once produced. `severity` is fully determined by
/// `(rule_id, config.rules[rule_id].severity)` — rules never choose
/// severity directly; [`crate::rules::apply_severity`] assigns it from
/// config right after a rule fires.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Finding {
    /// Stable rule identifier, e.g. `"auth-missing"`.
    pub rule_id: String,
    pub severity: Severity,
    pub confidence: Confidence,
    /// One human-readable line describing the issue.
    pub message: String,
    /// Project-relative POSIX path (forward slashes, even on Windows).
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub end_line: Option<usize>,
    pub end_column: Option<usize>,
    /// Source snippet, if one is available and useful.
    pub snippet: Option<String>,
    /// Ordered, non-empty list of short strings citing what was observed.
    pub evidence: Vec<String>,
    /// Ordered, non-empty list of suggested fixes.
    pub remediation: Vec<String>,
    pub tags: BTreeSet<String>,
}

impl Finding {
    /// A baseline-stable fingerprint, independent of line/column.
    pub fn key(&self) -> FindingKey {
        FindingKey::new(&self.rule_id, &self.file, &self.message)
    }

    /// Sort key used to bring per-file parallel results back into the
    /// deterministic `(rule_id, file, line, column)` order required by
    /// invariant 1 (determinism) before scoring.
    pub fn sort_key(&self) -> (String, String, usize, usize) {
        (
            self.rule_id.clone(),
            self.file.clone(),
            self.line.unwrap_or(0),
            self.column.unwrap_or(0),
        )
    }

    /// Dedup key used within a single file: `(rule_id, line, column, message)`.
    pub fn dedup_key(&self) -> (String, Option<usize>, Option<usize>, String) {
        (
            self.rule_id.clone(),
            self.line,
            self.column,
            normalize_message(&self.message),
        )
    }
}

/// Stable fingerprint `rule_id + "|" + file + "|" + normalized(message)` used
/// for baseline diffs. Independent of line numbers so reformatting a file
/// does not register a finding as "new".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct FindingKey(pub String);

impl FindingKey {
    pub fn new(rule_id: &str, file: &str, message: &str) -> Self {
        FindingKey(format!("{rule_id}|{file}|{}", normalize_message(message)))
    }
}

impl fmt::Display for FindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collapses runs of ASCII whitespace to single spaces and trims the ends.
fn normalize_message(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
