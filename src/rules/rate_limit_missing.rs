//! `rate-limit-missing`: a route handler or server action performing a
//! data-store mutation with no call to a configured rate-limiting wrapper.

use super::{FileContext, Rule, RuleHit};
use crate::finding::Confidence;
use crate::probes;

pub struct RateLimitMissingRule;

impl Rule for RateLimitMissingRule {
    fn id(&self) -> &'static str {
        "rate-limit-missing"
    }

    fn description(&self) -> &'static str {
        "Route handler or server action with no rate limiting"
    }

    fn applies_to(&self, ctx: &FileContext) -> bool {
        super::is_handler_or_action(ctx.relative_path, ctx.source)
            && probes::has_data_mutation(ctx.source)
    }

    fn evaluate(&self, ctx: &FileContext) -> Option<RuleHit> {
        if probes::has_rate_limit_call(ctx.source, ctx.hints) {
            return None;
        }

        Some(
            RuleHit::new(Confidence::Medium, "No rate limiting found in this handler")
                .with_evidence(format!(
                    "none of {:?} is called in {}",
                    ctx.hints.rate_limit.wrappers, ctx.relative_path
                ))
                .with_remediation("Wrap this handler with a rate limiter before accepting input")
                .with_tag("rate-limit"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hints;

    fn ctx<'a>(source: &'a str, hints: &'a Hints) -> FileContext<'a> {
        FileContext { relative_path: "app/api/login/route.ts", source, hints, middleware_present: false }
    }

    #[test]
    fn fires_when_no_rate_limit_wrapper_present() {
        let hints = Hints::default();
        let c = ctx(
            "export async function POST() { await db.user.create({ data }); return Response.json({}); }",
            &hints,
        );
        assert!(RateLimitMissingRule.applies_to(&c));
        assert!(RateLimitMissingRule.evaluate(&c).is_some());
    }

    #[test]
    fn does_not_fire_when_rate_limit_wrapper_present() {
        let hints = Hints::default();
        let c = ctx(
            "export async function POST(req) { await rateLimit(req); await db.user.create({ data }); return Response.json({}); }",
            &hints,
        );
        assert!(RateLimitMissingRule.evaluate(&c).is_none());
    }

    #[test]
    fn does_not_apply_without_a_data_mutation() {
        let hints = Hints::default();
        let c = ctx("export async function GET() { return Response.json({}); }", &hints);
        assert!(!RateLimitMissingRule.applies_to(&c));
    }
}
