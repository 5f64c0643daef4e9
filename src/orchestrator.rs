//! Scan orchestration (C10): wires every other component into one pipeline.
//!
//! detect → enumerate → per-file rule evaluation (parallel via rayon,
//! re-sorted afterward for determinism) → apply waivers → score → diff
//! against baseline → dispatch extension hooks → build [`ScanResult`].

use crate::baseline::{Baseline, BaselineDiff};
use crate::config::Config;
use crate::detector::{self, Detection};
use crate::enumerator;
use crate::error::{GateFailure, ShipguardError};
use crate::finding::Finding;
use crate::hooks::{GateResult, HookHost};
use crate::report::{ScanResult, Summary};
use crate::rules::{self, FileContext};
use crate::scoring;
use crate::waivers::{self, WaiversFile};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::Path;

/// Everything [`run`] needs beyond the project root.
pub struct ScanOptions<'a> {
    pub config: &'a Config,
    pub waivers: &'a WaiversFile,
    pub baseline: Option<&'a Baseline>,
    pub hooks: &'a HookHost,
    pub now: DateTime<Utc>,
}

/// Outcome of a full scan: the report plus the baseline diff used to build
/// its summary, kept separate since the CI gate needs the diff directly.
pub struct ScanOutcome {
    pub report: ScanResult,
    pub diff: BaselineDiff,
    pub detection: Detection,
}

/// Runs a full scan of `root` and returns the report.
///
/// `Err` only for conditions that abort the scan entirely: the project does
/// not look like the supported framework shape, or an extension hook vetoed
/// a phase. Per-file read errors are logged and skipped — they degrade
/// coverage, they never abort the run (spec §7).
pub fn run(root: &Path, options: &ScanOptions) -> Result<ScanOutcome, ShipguardError> {
    options.hooks.dispatch_init(options.config);

    if let GateResult::Fail { exit_code, message } = options.hooks.dispatch_config_loaded(options.config) {
        return Err(ShipguardError::GateFailure(GateFailure { exit_code, message }));
    }

    let detection =
        detector::detect(root).map_err(|reason| ShipguardError::Detector { reason })?;

    let files = enumerator::enumerate_files(root, &options.config.include, &options.config.exclude);
    let middleware_present = options
        .config
        .hints
        .auth
        .middleware_files
        .iter()
        .any(|name| root.join(name).is_file());

    let mut findings: Vec<Finding> = files
        .par_iter()
        .flat_map(|relative_path| evaluate_one(root, relative_path, options.config, middleware_present))
        .collect();

    findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    if let GateResult::Fail { exit_code, message } = options.hooks.dispatch_findings(&findings) {
        return Err(ShipguardError::GateFailure(GateFailure { exit_code, message }));
    }

    let (active, waived) = waivers::apply_waivers(findings, options.waivers, options.now);
    let score = scoring::compute_score(&active, &options.config.scoring);

    if let GateResult::Fail { exit_code, message } = options.hooks.dispatch_scored(score) {
        return Err(ShipguardError::GateFailure(GateFailure { exit_code, message }));
    }

    let empty_baseline = Baseline::default();
    let baseline = options.baseline.unwrap_or(&empty_baseline);
    let diff = baseline.diff(&active);

    if let GateResult::Fail { exit_code, message } = options.hooks.dispatch_report(&diff) {
        return Err(ShipguardError::GateFailure(GateFailure { exit_code, message }));
    }

    let summary = Summary::build(&active, &diff.new, diff.fixed.len());
    let report = ScanResult {
        version: 1,
        timestamp: options.now,
        framework: options.config.framework.clone(),
        score,
        findings: active,
        waived_findings: waived,
        summary,
    };

    Ok(ScanOutcome { report, diff, detection })
}

fn evaluate_one(root: &Path, relative_path: &str, config: &Config, middleware_present: bool) -> Vec<Finding> {
    let full_path = root.join(relative_path);
    let source = match std::fs::read_to_string(&full_path) {
        Ok(content) => content,
        Err(error) => {
            tracing::warn!(file = relative_path, %error, "could not read file, skipping");
            return Vec::new();
        }
    };

    let ctx = FileContext {
        relative_path,
        source: &source,
        hints: &config.hints,
        middleware_present,
    };
    rules::evaluate_file(&ctx, config)
}

/// Evaluates the CI gate (spec §4.10) against a completed scan.
///
/// Fails when any active finding meets or exceeds both `fail_on` severity
/// and `min_confidence`, or the score drops below `min_score`, or new
/// critical/high findings exceed their configured caps.
pub fn evaluate_ci_gate(outcome: &ScanOutcome, config: &Config) -> Result<(), GateFailure> {
    let ci = &config.ci;

    if let Some(finding) = outcome
        .report
        .findings
        .iter()
        .find(|f| f.severity >= ci.fail_on && f.confidence >= ci.min_confidence)
    {
        return Err(GateFailure {
            exit_code: 11,
            message: format!(
                "{} ({}, {} confidence) in {} meets the CI severity gate",
                finding.rule_id, finding.severity, finding.confidence, finding.file
            ),
        });
    }

    if outcome.report.score < ci.min_score {
        return Err(GateFailure {
            exit_code: 10,
            message: format!("score {} is below the minimum {}", outcome.report.score, ci.min_score),
        });
    }

    let new_critical = outcome.report.summary.new_critical as i64;
    if new_critical > ci.max_new_critical {
        return Err(GateFailure {
            exit_code: 12,
            message: format!(
                "{new_critical} new critical finding(s) exceed the allowed {}",
                ci.max_new_critical
            ),
        });
    }

    if let Some(max_new_high) = ci.max_new_high {
        let new_high = outcome.report.summary.new_high as i64;
        if new_high > max_new_high {
            return Err(GateFailure {
                exit_code: 13,
                message: format!("{new_high} new high finding(s) exceed the allowed {max_new_high}"),
            });
        }
    }

    Ok(())
}
