//! Typed error kinds with stable CI exit codes (spec §7).
//!
//! Every error that can surface out of the library carries an `exit_code`
//! so `main.rs` never has to re-derive the mapping from error kind to
//! process exit status — it just calls [`ShipguardError::exit_code`].

/// Library-level error. Per-file errors ([`ScanError::FileRead`],
/// [`ScanError::RuleInternal`]) are caught by the orchestrator and turned
/// into findings or warnings instead of propagating as this type — only
/// fatal, scan-aborting conditions reach here.
#[derive(Debug, thiserror::Error)]
pub enum ShipguardError {
    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    ConfigInvalid(String),

    /// Project is not the supported framework shape. `reason` is the exact
    /// single-line message the detector produced.
    #[error("{reason}")]
    Detector { reason: String },

    #[error("{0}")]
    GateFailure(GateFailure),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ShipguardError {
    /// Process exit code for this error, per spec §6.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShipguardError::ConfigParse { .. } | ShipguardError::ConfigInvalid(_) => 2,
            ShipguardError::Detector { .. } => 3,
            ShipguardError::GateFailure(g) => g.exit_code,
            ShipguardError::Io { .. } => 2,
        }
    }
}

/// Carries the exit code and message of a gate failure raised either by the
/// CI gate itself or by an [extension hook](crate::hooks).
#[derive(Debug, Clone)]
pub struct GateFailure {
    pub exit_code: i32,
    pub message: String,
}

impl std::fmt::Display for GateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A per-file error kind (spec §7: `FileReadError`, `RuleInternalError`).
///
/// These never abort a scan: the orchestrator logs them and, for
/// [`ScanError::RuleInternal`], emits a synthetic low-severity finding so the
/// failure is visible in the report instead of silently dropped.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("could not read {file}: {source}")]
    FileRead {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("rule {rule_id} failed on {file}: {message}")]
    RuleInternal {
        rule_id: String,
        file: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_spec() {
        assert_eq!(
            ShipguardError::Detector { reason: "x".into() }.exit_code(),
            3
        );
        assert_eq!(
            ShipguardError::GateFailure(GateFailure { exit_code: 11, message: "x".into() })
                .exit_code(),
            11
        );
    }
}
