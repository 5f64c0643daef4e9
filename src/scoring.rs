//! Deterministic scoring (C6).
//!
//! `score = max(0, start - sum(penalty[severity] for each active finding))`,
//! computed with plain integer arithmetic over the set of active (non-waived)
//! findings. Order-independent: the sum does not depend on finding order, so
//! parallel rule evaluation can never perturb the score (invariant 1).

use crate::config::ScoringConfig;
use crate::finding::Finding;

/// Computes the score for `findings` under `config`, clamped to zero.
pub fn compute_score(findings: &[Finding], config: &ScoringConfig) -> i64 {
    let penalty_total: i64 = findings
        .iter()
        .map(|f| config.penalties.get(&f.severity).copied().unwrap_or(0))
        .sum();
    (config.start - penalty_total).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::finding::{Confidence, Severity};
    use std::collections::BTreeSet;

    fn finding(severity: Severity) -> Finding {
        Finding {
            rule_id: "auth-missing".to_string(),
            severity,
            confidence: Confidence::Medium,
            message: "msg".to_string(),
            file: "app/route.ts".to_string(),
            line: None,
            column: None,
            end_line: None,
            end_column: None,
            snippet: None,
            evidence: vec![],
            remediation: vec![],
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn score_subtracts_each_finding_penalty() {
        let config = ScoringConfig::default();
        let score = compute_score(&[finding(Severity::Critical), finding(Severity::High)], &config);
        assert_eq!(score, 100 - 40 - 20);
    }

    #[test]
    fn score_never_goes_below_zero() {
        let config = ScoringConfig::default();
        let findings: Vec<Finding> = (0..10).map(|_| finding(Severity::Critical)).collect();
        assert_eq!(compute_score(&findings, &config), 0);
    }

    #[test]
    fn score_is_independent_of_finding_order() {
        let config = ScoringConfig::default();
        let a = [finding(Severity::Critical), finding(Severity::Low)];
        let b = [finding(Severity::Low), finding(Severity::Critical)];
        assert_eq!(compute_score(&a, &config), compute_score(&b, &config));
    }
}
