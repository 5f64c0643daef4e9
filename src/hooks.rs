//! Extension hook host (C9).
//!
//! An [`ExtensionHook`] can observe and veto a scan at four points. Hooks run
//! in registration order within a phase; the first non-ok [`GateResult`]
//! short-circuits the remaining hooks in that phase — the orchestrator never
//! needs to know how many extensions are installed, only the final verdict.

use crate::baseline::BaselineDiff;
use crate::config::Config;
use crate::finding::Finding;

/// A single phase's verdict: either the scan may proceed, or it must stop
/// with the given exit code and message (the same shape as
/// [`GateFailure`](crate::error::GateFailure), since either can end a run).
#[derive(Debug, Clone)]
pub enum GateResult {
    Ok,
    Fail { exit_code: i32, message: String },
}

impl GateResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, GateResult::Ok)
    }
}

/// An optional observer/veto point in the scan pipeline. Every method
/// defaults to a no-op [`GateResult::Ok`] so an extension only needs to
/// implement the phases it cares about.
pub trait ExtensionHook: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fires once config is loaded, before detection starts. Return value is
    /// collected but never gates the scan — purely informational.
    fn on_init(&self, _config: &Config) {}

    fn on_config_loaded(&self, _config: &Config) -> GateResult {
        GateResult::Ok
    }

    fn on_findings(&self, _findings: &[Finding]) -> GateResult {
        GateResult::Ok
    }

    fn on_scored(&self, _score: i64) -> GateResult {
        GateResult::Ok
    }

    fn on_report(&self, _diff: &BaselineDiff) -> GateResult {
        GateResult::Ok
    }
}

/// Dispatches a phase across `hooks` in order, stopping at (and returning)
/// the first non-ok result.
pub struct HookHost {
    hooks: Vec<Box<dyn ExtensionHook>>,
}

impl HookHost {
    pub fn new(hooks: Vec<Box<dyn ExtensionHook>>) -> Self {
        HookHost { hooks }
    }

    pub fn dispatch_init(&self, config: &Config) {
        for hook in &self.hooks {
            hook.on_init(config);
        }
    }

    pub fn dispatch_config_loaded(&self, config: &Config) -> GateResult {
        for hook in &self.hooks {
            let result = hook.on_config_loaded(config);
            if !result.is_ok() {
                return result;
            }
        }
        GateResult::Ok
    }

    pub fn dispatch_findings(&self, findings: &[Finding]) -> GateResult {
        for hook in &self.hooks {
            let result = hook.on_findings(findings);
            if !result.is_ok() {
                return result;
            }
        }
        GateResult::Ok
    }

    pub fn dispatch_scored(&self, score: i64) -> GateResult {
        for hook in &self.hooks {
            let result = hook.on_scored(score);
            if !result.is_ok() {
                return result;
            }
        }
        GateResult::Ok
    }

    pub fn dispatch_report(&self, diff: &BaselineDiff) -> GateResult {
        for hook in &self.hooks {
            let result = hook.on_report(diff);
            if !result.is_ok() {
                return result;
            }
        }
        GateResult::Ok
    }
}
