//! # shipguard
//!
//! Static-analysis security scanner for app-router route handlers and server
//! actions: missing authentication, missing rate limiting, missing
//! multi-tenant data scoping, and SSRF via outbound HTTP calls driven by
//! user-controlled URLs.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use chrono::Utc;
//! use shipguard::{config::Config, hooks::HookHost, orchestrator::{self, ScanOptions}, output, waivers::WaiversFile};
//!
//! let root = Path::new("./my-app");
//! let config = Config::load(root, None).expect("failed to load config");
//! let waivers = WaiversFile::default();
//! let hooks = HookHost::new(Vec::new());
//! let options = ScanOptions { config: &config, waivers: &waivers, baseline: None, hooks: &hooks, now: Utc::now() };
//!
//! let outcome = orchestrator::run(root, &options).expect("scan failed");
//! let text = output::format_report(&outcome.report, &output::OutputFormat::Pretty);
//! print!("{text}");
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around a pipeline:
//!
//! 1. **[`detector`]** — confirms the project is the supported framework shape.
//! 2. **[`enumerator`]** — walks the project for files matching the configured globs.
//! 3. **[`probes`]** — pure textual detectors over a single file's source.
//! 4. **[`rules`]** — combines probes into named, severity-scored findings.
//! 5. **[`waivers`]** — suppresses findings matching an active `(ruleId, file)` waiver.
//! 6. **[`scoring`]** — computes a deterministic score from active findings.
//! 7. **[`baseline`]** — diffs a scan against a prior snapshot.
//! 8. **[`hooks`]** — lets extensions observe and veto a scan at four points.
//! 9. **[`orchestrator`]** — wires the above into one pipeline and evaluates the CI gate.
//! 10. **[`output`]** — renders a [`report::ScanResult`] as pretty text, JSON, or SARIF.

pub mod baseline;
pub mod config;
pub mod detector;
pub mod enumerator;
pub mod error;
pub mod finding;
pub mod hooks;
pub mod orchestrator;
pub mod output;
pub mod probes;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod waivers;
