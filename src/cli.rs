//! Command-line interface definition.
//!
//! Uses [clap] derive macros to parse arguments. This module is only used by
//! the binary crate (`src/main.rs`).

use clap::{Parser, Subcommand};
use shipguard::output::OutputFormat;
use std::path::PathBuf;

/// Static analysis for app-router route handlers and server actions.
#[derive(Parser)]
#[command(name = "shipguard", version, about = "Static analysis security scanner for app-router projects")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a project and print a report. Always exits 0 unless the scan
    /// itself fails (see `ci` for a report that gates on findings).
    Scan {
        /// Path to the project root (must contain package.json and app/).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format (pretty, json, or sarif).
        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        /// Write output to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Path to a custom configuration file (defaults to shipguard.json).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Baseline file to diff new/fixed findings against.
        #[arg(long)]
        baseline: Option<PathBuf>,
    },

    /// Scan a project and apply the CI gate (spec's gating rules); exits
    /// non-zero when the gate fails.
    Ci {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        baseline: Option<PathBuf>,
    },

    /// Write a default `shipguard.json` configuration file.
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Record a waiver suppressing a rule for a specific file.
    Waive {
        /// Rule ID to waive, e.g. `auth-missing`.
        rule_id: String,

        /// Project-relative file the waiver applies to.
        #[arg(long)]
        file: String,

        /// Human-readable justification, recorded alongside the waiver.
        #[arg(long)]
        reason: String,

        /// RFC 3339 timestamp after which the waiver no longer applies.
        #[arg(long)]
        expiry: Option<String>,

        /// Path to the project root.
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Scan a project and write its active findings as a new baseline.
    Baseline {
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(long, default_value = ".shipguard-baseline.json")]
        output: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List every built-in rule with its default severity and description.
    #[command(name = "list-rules")]
    ListRules,

    /// Show the full explanation and remediation for a specific rule.
    Explain {
        /// Rule ID to look up, e.g. `auth-missing`.
        rule_id: String,
    },
}
