//! Rule set (C4): combines [probes](crate::probes) into named, scored findings.
//!
//! Each [`Rule`] inspects a single file's source in isolation, with no
//! cross-file state, so the orchestrator can hand every file to the full
//! rule set in parallel via rayon and bring results back into deterministic
//! order afterward (spec invariant 1).

mod auth_missing;
mod rate_limit_missing;
mod ssrf_user_url;
mod tenancy_missing;
mod unauth_payment_intent;

use crate::config::{Config, Hints};
use crate::finding::{Confidence, Finding};
use std::collections::BTreeSet;

/// Everything a [`Rule`] needs to evaluate a single file. Built once per
/// file by the orchestrator and shared across every rule.
pub struct FileContext<'a> {
    /// Project-relative POSIX path.
    pub relative_path: &'a str,
    pub source: &'a str,
    pub hints: &'a Hints,
    /// True when a `middleware.ts`/`middleware.js` file exists at the
    /// project root. Treated as a project-wide auth gate that exempts every
    /// route from [`auth_missing`] — the scanner does not parse the
    /// middleware's own matcher config.
    pub middleware_present: bool,
}

/// What a rule reports before severity is attached. Rules never choose
/// their own severity: [`apply_severity`] stamps it from [`Config`]
/// immediately after a rule fires, so severity always tracks the current
/// config regardless of which rule produced the hit.
pub struct RuleHit {
    pub confidence: Confidence,
    pub message: String,
    pub evidence: Vec<String>,
    pub remediation: Vec<String>,
    pub tags: BTreeSet<String>,
    pub line: Option<usize>,
}

impl RuleHit {
    pub fn new(confidence: Confidence, message: impl Into<String>) -> Self {
        RuleHit {
            confidence,
            message: message.into(),
            evidence: Vec::new(),
            remediation: Vec::new(),
            tags: BTreeSet::new(),
            line: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation.push(remediation.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// A single, independently-evaluated check over one file.
///
/// Implementers **must** be [`Send`] + [`Sync`]: [`evaluate_file`] is called
/// from inside a rayon `par_iter` over every scanned file.
pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. `"auth-missing"`. Matches a key in
    /// [`Config::rules`] and the `ruleId` recorded in waivers and baselines.
    fn id(&self) -> &'static str;

    /// Short description surfaced by the `list-rules`/`explain` CLI commands.
    fn description(&self) -> &'static str;

    /// Whether this rule evaluates `ctx` at all. Checked before
    /// [`Rule::evaluate`] so non-route, non-action files never reach rule
    /// logic.
    fn applies_to(&self, ctx: &FileContext) -> bool;

    /// Runs the check. Only called when [`Rule::applies_to`] returned `true`.
    fn evaluate(&self, ctx: &FileContext) -> Option<RuleHit>;
}

/// Returns every built-in rule, in a fixed order. The order has no effect on
/// output — findings are always re-sorted to `(rule_id, file, line, column)`
/// before scoring.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(auth_missing::AuthMissingRule),
        Box::new(rate_limit_missing::RateLimitMissingRule),
        Box::new(tenancy_missing::TenancyMissingRule),
        Box::new(ssrf_user_url::SsrfUserUrlRule),
        Box::new(unauth_payment_intent::UnauthPaymentIntentRule),
    ]
}

/// Runs every applicable, non-allowlisted rule against `ctx`, turning each
/// hit into a [`Finding`] with severity stamped from `config`.
pub fn evaluate_file(ctx: &FileContext, config: &Config) -> Vec<Finding> {
    all_rules()
        .iter()
        .filter(|rule| rule.applies_to(ctx))
        .filter(|rule| !is_allowlisted(rule.id(), ctx.relative_path, config))
        .filter_map(|rule| {
            let hit = rule.evaluate(ctx)?;
            Some(apply_severity(rule.id(), hit, ctx.relative_path, config))
        })
        .collect()
}

/// True when `relative_path` matches one of `rule_id`'s configured
/// allowlist globs (the spec's Open Question resolution: per-rule
/// allowlists live in [`crate::config::RuleConfig`], checked here before a
/// rule runs at all, alongside the global exclude set in
/// [`crate::enumerator`]).
fn is_allowlisted(rule_id: &str, relative_path: &str, config: &Config) -> bool {
    config
        .allow_for(rule_id)
        .iter()
        .any(|glob| crate::enumerator::glob_matches(glob, relative_path))
}

fn apply_severity(rule_id: &str, hit: RuleHit, file: &str, config: &Config) -> Finding {
    Finding {
        rule_id: rule_id.to_string(),
        severity: config.severity_for(rule_id),
        confidence: hit.confidence,
        message: hit.message,
        file: file.to_string(),
        line: hit.line,
        column: None,
        end_line: None,
        end_column: None,
        snippet: None,
        evidence: hit.evidence,
        remediation: hit.remediation,
        tags: hit.tags,
    }
}

/// True when `relative_path` looks like an app-router route handler
/// (`route.ts`/`.tsx`/`.js`/`.jsx`) or `source` carries a leading
/// `"use server"` directive — the two file shapes every rule in this module
/// restricts itself to.
pub(crate) fn is_handler_or_action(relative_path: &str, source: &str) -> bool {
    crate::detector::is_route_handler_path(relative_path)
        || crate::detector::leading_directive_is_use_server(source)
}
