//! Waivers (C5): per-`(ruleId, file)` suppressions with optional expiry.
//!
//! Stored at [`Config::waivers_file`](crate::config::Config::waivers_file),
//! a versioned JSON document. A bare JSON array is also accepted on read for
//! files written by an older tool — it is treated as `version: 1` with no
//! other metadata, same vintage-tolerant reading the teacher's config loader
//! practices for its own legacy shapes.

use crate::finding::Finding;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;

/// A single suppression: every finding matching `(rule_id, file)` is
/// excluded from scoring and the CI gate while the waiver is active.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waiver {
    pub rule_id: String,
    pub file: String,
    pub reason: String,
    /// Waiver stops applying at this time; absent means it never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Waiver {
    /// True when this waiver is in effect at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expiry.map_or(true, |expiry| now < expiry)
    }
}

/// The on-disk waiver store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WaiversFile {
    pub version: u32,
    pub waivers: Vec<Waiver>,
}

impl Default for WaiversFile {
    fn default() -> Self {
        WaiversFile { version: 1, waivers: Vec::new() }
    }
}

impl WaiversFile {
    /// Loads `path`, returning an empty store if the file does not exist.
    /// Accepts either the versioned object shape or a bare array.
    pub fn load(path: &Path) -> Result<WaiversFile, String> {
        if !path.exists() {
            return Ok(WaiversFile::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
    }

    fn parse(content: &str) -> Result<WaiversFile, serde_json::Error> {
        if let Ok(bare) = serde_json::from_str::<Vec<Waiver>>(content) {
            return Ok(WaiversFile { version: 1, waivers: bare });
        }
        serde_json::from_str::<WaiversFile>(content)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize waivers: {e}"))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))
    }

    pub fn add(&mut self, waiver: Waiver) {
        self.waivers.retain(|w| !(w.rule_id == waiver.rule_id && w.file == waiver.file));
        self.waivers.push(waiver);
    }

    /// Builds an O(1)-lookup index keyed by `(rule_id, file)`, so applying
    /// waivers over `F` findings against `W` waivers costs `O(F + W)` rather
    /// than the naive `O(F * W)`.
    fn index(&self) -> HashMap<(&str, &str), Vec<&Waiver>> {
        let mut map: HashMap<(&str, &str), Vec<&Waiver>> = HashMap::new();
        for waiver in &self.waivers {
            map.entry((waiver.rule_id.as_str(), waiver.file.as_str())).or_default().push(waiver);
        }
        map
    }
}

/// Splits `findings` into `(active, waived)` using `waivers` active at `now`.
pub fn apply_waivers(
    findings: Vec<Finding>,
    waivers: &WaiversFile,
    now: DateTime<Utc>,
) -> (Vec<Finding>, Vec<Finding>) {
    let index = waivers.index();
    let mut active = Vec::new();
    let mut waived = Vec::new();

    for finding in findings {
        let is_waived = index
            .get(&(finding.rule_id.as_str(), finding.file.as_str()))
            .is_some_and(|ws| ws.iter().any(|w| w.is_active(now)));

        if is_waived {
            waived.push(finding);
        } else {
            active.push(finding);
        }
    }

    (active, waived)
}
