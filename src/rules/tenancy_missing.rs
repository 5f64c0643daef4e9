//! `tenancy-missing`: a data-mutating query with a `where` clause that never
//! references a configured tenant/organization field.

use super::{FileContext, Rule, RuleHit};
use crate::finding::Confidence;
use crate::probes;

pub struct TenancyMissingRule;

impl Rule for TenancyMissingRule {
    fn id(&self) -> &'static str {
        "tenancy-missing"
    }

    fn description(&self) -> &'static str {
        "Data-mutating query scoped by a where clause with no tenant field"
    }

    fn applies_to(&self, ctx: &FileContext) -> bool {
        super::is_handler_or_action(ctx.relative_path, ctx.source)
            && probes::has_data_mutation(ctx.source)
            && probes::has_where_clause(ctx.source)
    }

    fn evaluate(&self, ctx: &FileContext) -> Option<RuleHit> {
        if probes::has_tenant_scope(ctx.source, ctx.hints) {
            return None;
        }

        Some(
            RuleHit::new(
                Confidence::High,
                "Data mutation is scoped by a where clause with no tenant field",
            )
            .with_evidence(format!(
                "none of {:?} appears in a where clause in {}",
                ctx.hints.tenancy.org_field_names, ctx.relative_path
            ))
            .with_remediation("Add a tenant/organization field to the where clause")
            .with_tag("tenancy"),
        )
    }
}
