//! `unauth-payment-intent`: a handler that creates a payment intent or
//! checkout session with no authentication check. Scoped narrower than
//! `auth-missing` but rated `Critical` by default since it gates money
//! movement rather than a generic read.

use super::{FileContext, Rule, RuleHit};
use crate::finding::Confidence;
use crate::probes;
use regex::Regex;
use std::sync::LazyLock;

static PAYMENT_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:stripe\.paymentIntents|stripe\.checkout\.sessions|paymentIntents|checkoutSessions)\s*\.\s*create\s*\(").unwrap()
});

pub struct UnauthPaymentIntentRule;

impl Rule for UnauthPaymentIntentRule {
    fn id(&self) -> &'static str {
        "unauth-payment-intent"
    }

    fn description(&self) -> &'static str {
        "Payment intent or checkout session created with no authentication check"
    }

    fn applies_to(&self, ctx: &FileContext) -> bool {
        !ctx.middleware_present
            && super::is_handler_or_action(ctx.relative_path, ctx.source)
            && PAYMENT_CALL_RE.is_match(ctx.source)
    }

    fn evaluate(&self, ctx: &FileContext) -> Option<RuleHit> {
        if probes::has_auth_call(ctx.source, ctx.hints) {
            return None;
        }

        Some(
            RuleHit::new(
                Confidence::High,
                "Payment intent created with no authentication check",
            )
            .with_evidence(format!("payment creation call with no auth call in {}", ctx.relative_path))
            .with_remediation("Require an authenticated, billable session before creating a payment intent")
            .with_tag("payments")
            .with_tag("auth"),
        )
    }
}
