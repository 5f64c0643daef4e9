//! Configuration loading.
//!
//! The scanner consumes a single, fully-populated [`Config`] value; no
//! component probes for field presence at use sites (design note: explicit
//! config over duck-typed merging). All fields default so the config file
//! can be omitted entirely, same resolution order as the teacher's
//! `Config::load`: explicit path (error if missing) → `shipguard.json` in
//! the project root → [`Config::default`].

use crate::error::ShipguardError;
use crate::finding::{Confidence, Severity};
use std::collections::BTreeMap;
use std::path::Path;

/// Main configuration for a scan. Loaded from a JSON file at the project
/// root; every field carries a default.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Target framework tag; the detector must accept this value.
    pub framework: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub hints: Hints,
    /// Per-rule overrides, keyed by rule id.
    pub rules: BTreeMap<String, RuleConfig>,
    pub scoring: ScoringConfig,
    pub ci: CiConfig,
    /// Relative path to the waiver store.
    pub waivers_file: String,
    /// Opaque block the OSS core never inspects; round-tripped verbatim so
    /// extensions can read it without the core understanding its schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governance: Option<serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            framework: "next".to_string(),
            include: vec![
                "app/**/route.{ts,tsx,js,jsx}".to_string(),
                "app/**/*.{ts,tsx,js,jsx}".to_string(),
            ],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/*.test.*".to_string(),
                "**/*.spec.*".to_string(),
            ],
            hints: Hints::default(),
            rules: default_rules(),
            scoring: ScoringConfig::default(),
            ci: CiConfig::default(),
            waivers_file: ".shipguard-waivers.json".to_string(),
            governance: None,
        }
    }
}

fn default_rules() -> BTreeMap<String, RuleConfig> {
    let mut m = BTreeMap::new();
    m.insert("auth-missing".to_string(), RuleConfig::new(Severity::High));
    m.insert(
        "rate-limit-missing".to_string(),
        RuleConfig::new(Severity::High),
    );
    m.insert(
        "tenancy-missing".to_string(),
        RuleConfig::new(Severity::High),
    );
    m.insert("ssrf-user-url".to_string(), RuleConfig::new(Severity::High));
    m.insert(
        "unauth-payment-intent".to_string(),
        RuleConfig::new(Severity::Critical),
    );
    m
}

/// Per-rule override: severity and an optional path allowlist.
///
/// A file matching `allow` short-circuits this rule for that file (spec's
/// Open Question resolution: per-rule allowlists live here, alongside the
/// global exclude set in [`crate::enumerator`]).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub severity: Severity,
    pub allow: Vec<String>,
}

impl RuleConfig {
    fn new(severity: Severity) -> Self {
        RuleConfig { severity, allow: Vec::new() }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig::new(Severity::Med)
    }
}

/// Symbol/file hints that the probes in [`crate::probes`] match against.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hints {
    pub auth: AuthHints,
    pub rate_limit: RateLimitHints,
    pub tenancy: TenancyHints,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthHints {
    /// Symbol names counted as "authentication call" when referenced.
    pub functions: Vec<String>,
    /// Files whose existence satisfies auth at the URL prefix they cover.
    pub middleware_files: Vec<String>,
}

impl Default for AuthHints {
    fn default() -> Self {
        AuthHints {
            functions: vec![
                "auth".to_string(),
                "getServerSession".to_string(),
                "requireAuth".to_string(),
                "verifySession".to_string(),
            ],
            middleware_files: vec!["middleware.ts".to_string(), "middleware.js".to_string()],
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateLimitHints {
    /// Symbol names counted as rate-limit evidence.
    pub wrappers: Vec<String>,
}

impl Default for RateLimitHints {
    fn default() -> Self {
        RateLimitHints {
            wrappers: vec![
                "rateLimit".to_string(),
                "limiter".to_string(),
                "ratelimit".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TenancyHints {
    /// Field names that satisfy tenant scoping in a query where-clause.
    pub org_field_names: Vec<String>,
}

impl Default for TenancyHints {
    fn default() -> Self {
        TenancyHints {
            org_field_names: vec![
                "orgId".to_string(),
                "organizationId".to_string(),
                "tenantId".to_string(),
                "workspaceId".to_string(),
            ],
        }
    }
}

/// Deterministic scoring parameters (spec §4.6).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub start: i64,
    pub penalties: BTreeMap<Severity, i64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut penalties = BTreeMap::new();
        penalties.insert(Severity::Critical, 40);
        penalties.insert(Severity::High, 20);
        penalties.insert(Severity::Med, 10);
        penalties.insert(Severity::Low, 5);
        ScoringConfig { start: 100, penalties }
    }
}

/// CI gate thresholds (spec §4.10).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CiConfig {
    pub fail_on: Severity,
    pub min_confidence: Confidence,
    pub min_score: i64,
    pub max_new_critical: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_new_high: Option<i64>,
}

impl Default for CiConfig {
    fn default() -> Self {
        CiConfig {
            fail_on: Severity::High,
            min_confidence: Confidence::Medium,
            min_score: 0,
            max_new_critical: 0,
            max_new_high: None,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// Resolution order:
    /// 1. If `path` is `Some`, load from that file (error if missing).
    /// 2. If `path` is `None`, try `shipguard.json` under `root`.
    /// 3. If that file does not exist either, return [`Config::default()`].
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Config, ShipguardError> {
        let resolved = match path {
            Some(p) => {
                if p.exists() {
                    Some(p.to_path_buf())
                } else {
                    return Err(ShipguardError::ConfigInvalid(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
            }
            None => {
                let default_path = root.join("shipguard.json");
                default_path.exists().then_some(default_path)
            }
        };

        match resolved {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| ShipguardError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?;
                let config: Config =
                    serde_json::from_str(&content).map_err(|e| ShipguardError::ConfigParse {
                        path: path.display().to_string(),
                        source: e,
                    })?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }

    /// Returns the effective severity for a rule, falling back to
    /// [`Severity::Med`] for rules with no explicit entry.
    pub fn severity_for(&self, rule_id: &str) -> Severity {
        self.rules
            .get(rule_id)
            .map(|r| r.severity)
            .unwrap_or(Severity::Med)
    }

    /// Returns the per-rule path allowlist globs, if any are configured.
    pub fn allow_for(&self, rule_id: &str) -> &[String] {
        self.rules
            .get(rule_id)
            .map(|r| r.allow.as_slice())
            .unwrap_or(&[])
    }
}
