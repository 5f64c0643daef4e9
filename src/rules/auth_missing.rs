//! `auth-missing`: a route handler or server action with no call to a
//! configured authentication function.

use super::{FileContext, Rule, RuleHit};
use crate::finding::Confidence;
use crate::probes;

pub struct AuthMissingRule;

impl Rule for AuthMissingRule {
    fn id(&self) -> &'static str {
        "auth-missing"
    }

    fn description(&self) -> &'static str {
        "Route handler or server action with no authentication check"
    }

    fn applies_to(&self, ctx: &FileContext) -> bool {
        !ctx.middleware_present && super::is_handler_or_action(ctx.relative_path, ctx.source)
    }

    fn evaluate(&self, ctx: &FileContext) -> Option<RuleHit> {
        if probes::has_auth_call(ctx.source, ctx.hints) {
            return None;
        }

        let confidence = if probes::has_data_mutation(ctx.source) {
            Confidence::High
        } else {
            Confidence::Medium
        };

        Some(
            RuleHit::new(confidence, "No authentication check found in this handler")
                .with_evidence(format!(
                    "none of {:?} is called in {}",
                    ctx.hints.auth.functions, ctx.relative_path
                ))
                .with_remediation(
                    "Call an authentication function (e.g. getServerSession) before handling the request",
                )
                .with_tag("auth"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hints;

    fn ctx<'a>(relative_path: &'a str, source: &'a str, hints: &'a Hints) -> FileContext<'a> {
        FileContext { relative_path, source, hints, middleware_present: false }
    }

    #[test]
    fn fires_when_no_auth_call_present() {
        let hints = Hints::default();
        let source = "export async function GET(req) { return Response.json({}); }";
        let c = ctx("app/api/users/route.ts", source, &hints);
        assert!(AuthMissingRule.applies_to(&c));
        let hit = AuthMissingRule.evaluate(&c).unwrap();
        assert_eq!(hit.confidence, crate::finding::Confidence::Medium);
    }

    #[test]
    fn fires_at_high_confidence_when_handler_mutates_data() {
        let hints = Hints::default();
        let source = "export async function POST(req) { await db.user.create({ data }); return Response.json({}); }";
        let c = ctx("app/api/users/route.ts", source, &hints);
        let hit = AuthMissingRule.evaluate(&c).unwrap();
        assert_eq!(hit.confidence, crate::finding::Confidence::High);
    }

    #[test]
    fn does_not_fire_when_auth_call_present() {
        let hints = Hints::default();
        let source = "export async function GET() { const session = await getServerSession(); return Response.json(session); }";
        let c = ctx("app/api/users/route.ts", source, &hints);
        assert!(AuthMissingRule.evaluate(&c).is_none());
    }

    #[test]
    fn does_not_apply_when_middleware_present() {
        let hints = Hints::default();
        let c = FileContext {
            relative_path: "app/api/users/route.ts",
            source: "export async function GET() {}",
            hints: &hints,
            middleware_present: true,
        };
        assert!(!AuthMissingRule.applies_to(&c));
    }

    #[test]
    fn does_not_apply_to_non_handler_files() {
        let hints = Hints::default();
        let c = ctx("app/api/users/helper.ts", "export function util() {}", &hints);
        assert!(!AuthMissingRule.applies_to(&c));
    }
}
