//! `ssrf-user-url`: an outbound HTTP call whose URL argument is influenced by
//! request input, a classic server-side request forgery vector.

use super::{FileContext, Rule, RuleHit};
use crate::finding::Confidence;
use crate::probes;

pub struct SsrfUserUrlRule;

impl Rule for SsrfUserUrlRule {
    fn id(&self) -> &'static str {
        "ssrf-user-url"
    }

    fn description(&self) -> &'static str {
        "Outbound HTTP call whose URL is derived from request input"
    }

    fn applies_to(&self, ctx: &FileContext) -> bool {
        super::is_handler_or_action(ctx.relative_path, ctx.source)
    }

    fn evaluate(&self, ctx: &FileContext) -> Option<RuleHit> {
        let result = probes::detect_outbound_fetcher(ctx.source);
        if !result.is_risky() {
            return None;
        }

        let mut hit = RuleHit::new(
            Confidence::High,
            "Outbound HTTP call uses a request-derived URL without an allowlist check",
        )
        .with_remediation("Validate the target host against an allowlist before making the call")
        .with_tag("ssrf");

        for e in result.evidence {
            hit = hit.with_evidence(e);
        }
        if let Some(line) = result.line {
            hit = hit.with_line(line);
        }
        Some(hit)
    }
}
