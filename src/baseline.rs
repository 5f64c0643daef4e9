//! Baseline diffing (C7).
//!
//! A baseline is a snapshot of [`FindingKey`]s from a prior scan (e.g. `main`
//! before a feature branch). Diffing against the current scan's keys tells
//! the CI gate which findings are genuinely new versus pre-existing debt,
//! independent of line numbers so an unrelated reformat never registers as
//! "new".

use crate::finding::{Finding, FindingKey};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub keys: BTreeSet<FindingKey>,
}

impl Baseline {
    /// Builds a baseline snapshot from the findings of a scan.
    pub fn from_findings(findings: &[Finding]) -> Baseline {
        Baseline { keys: findings.iter().map(Finding::key).collect() }
    }

    pub fn read(path: &Path) -> Result<Baseline, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize baseline: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))
    }

    /// Diffs `current` against this baseline: findings present in `current`
    /// but not here are `new`; findings here but absent from `current` are
    /// `fixed`.
    pub fn diff(&self, current: &[Finding]) -> BaselineDiff {
        let mut new = Vec::new();
        let mut seen = BTreeSet::new();

        for finding in current {
            let key = finding.key();
            seen.insert(key.clone());
            if !self.keys.contains(&key) {
                new.push(finding.clone());
            }
        }

        let fixed: Vec<FindingKey> =
            self.keys.iter().filter(|k| !seen.contains(*k)).cloned().collect();

        BaselineDiff { new, fixed }
    }
}

/// Result of [`Baseline::diff`].
pub struct BaselineDiff {
    /// Findings present now that were absent from the baseline.
    pub new: Vec<Finding>,
    /// Baseline keys with no matching finding in the current scan.
    pub fixed: Vec<FindingKey>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Confidence, Severity};
    use std::collections::BTreeSet as Set;

    fn finding(rule_id: &str, file: &str) -> Finding {
        Finding {
            rule_id: rule_id.to_string(),
            severity: Severity::High,
            confidence: Confidence::Medium,
            message: "msg".to_string(),
            file: file.to_string(),
            line: Some(1),
            column: None,
            end_line: None,
            end_column: None,
            snippet: None,
            evidence: vec![],
            remediation: vec![],
            tags: Set::new(),
        }
    }

    #[test]
    fn findings_absent_from_baseline_are_new() {
        let baseline = Baseline::default();
        let current = vec![finding("auth-missing", "app/route.ts")];
        let diff = baseline.diff(&current);
        assert_eq!(diff.new.len(), 1);
        assert!(diff.fixed.is_empty());
    }

    #[test]
    fn findings_in_baseline_but_not_current_are_fixed() {
        let baseline = Baseline::from_findings(&[finding("auth-missing", "app/route.ts")]);
        let diff = baseline.diff(&[]);
        assert!(diff.new.is_empty());
        assert_eq!(diff.fixed.len(), 1);
    }

    #[test]
    fn diff_is_independent_of_line_number_changes() {
        let baseline = Baseline::from_findings(&[finding("auth-missing", "app/route.ts")]);
        let mut moved = finding("auth-missing", "app/route.ts");
        moved.line = Some(42);
        let diff = baseline.diff(&[moved]);
        assert!(diff.new.is_empty());
        assert!(diff.fixed.is_empty());
    }
}
