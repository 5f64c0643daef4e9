//! JSON output formatter.
//!
//! [`ScanResult`] is already shaped the way the CLI's `--format json` output
//! is documented (spec §6): a dedicated wrapper struct would just duplicate
//! its fields, so this formatter serializes it directly.

use crate::report::ScanResult;

/// Formats a [`ScanResult`] as pretty-printed JSON.
///
/// # Panics
///
/// Panics if the report cannot be serialized (should not happen with valid data).
pub fn format(report: &ScanResult) -> String {
    serde_json::to_string_pretty(report).expect("JSON serialization failed")
}
