//! Top-level scan report.
//!
//! [`ScanResult`] is the single JSON-serializable value every output format
//! in [`crate::output`] renders: pretty, plain JSON, or SARIF.

use crate::finding::{Finding, Severity};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub framework: String,
    pub score: i64,
    /// Active findings — not currently waived.
    pub findings: Vec<Finding>,
    /// Findings suppressed by an active waiver, kept for visibility.
    pub waived_findings: Vec<Finding>,
    pub summary: Summary,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub new: usize,
    pub new_critical: usize,
    pub new_high: usize,
    pub fixed: usize,
}

impl Summary {
    pub fn build(findings: &[Finding], new: &[Finding], fixed_count: usize) -> Summary {
        let mut by_severity = BTreeMap::new();
        for finding in findings {
            *by_severity.entry(finding.severity).or_insert(0) += 1;
        }
        let new_critical = new.iter().filter(|f| f.severity == Severity::Critical).count();
        let new_high = new.iter().filter(|f| f.severity == Severity::High).count();

        Summary {
            total: findings.len(),
            by_severity,
            new: new.len(),
            new_critical,
            new_high,
            fixed: fixed_count,
        }
    }
}
