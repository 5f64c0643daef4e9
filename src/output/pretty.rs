//! Human-readable colored text formatter.
//!
//! Produces a terminal-friendly report: a header, active findings grouped by
//! severity, waived findings, and a one-line summary with the score.

use crate::finding::Severity;
use crate::report::ScanResult;
use colored::Colorize;

/// Formats a [`ScanResult`] as human-readable, ANSI-colored text.
pub fn format(report: &ScanResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}\n",
        format!("  shipguard: {}  ", report.framework).bold().on_blue().white()
    ));
    out.push_str(&format!("  Timestamp: {}\n\n", report.timestamp));

    if report.findings.is_empty() {
        out.push_str(&format!("{}\n\n", "No active findings.".green()));
    } else {
        out.push_str(&format!("{}\n", "Findings".bold().underline()));
        for finding in &report.findings {
            let severity_str = match finding.severity {
                Severity::Critical => "CRIT".red().bold().to_string(),
                Severity::High => "HIGH".red().to_string(),
                Severity::Med => " MED".yellow().to_string(),
                Severity::Low => " LOW".blue().to_string(),
            };

            out.push_str(&format!(
                "  [{severity_str}] {rule_id:<25} {message}\n",
                rule_id = finding.rule_id.dimmed(),
                message = finding.message,
            ));

            let location = match finding.line {
                Some(line) => format!("{}:{}", finding.file, line),
                None => finding.file.clone(),
            };
            out.push_str(&format!("         {}\n", location.dimmed()));

            for evidence in &finding.evidence {
                out.push_str(&format!("         > {}\n", evidence.dimmed()));
            }
        }
        out.push('\n');
    }

    if !report.waived_findings.is_empty() {
        out.push_str(&format!(
            "{} ({} waived)\n",
            "Waived".bold().underline(),
            report.waived_findings.len()
        ));
        for finding in &report.waived_findings {
            out.push_str(&format!(
                "  [SKIP] {:<25} {}\n",
                finding.rule_id.dimmed(),
                finding.file.dimmed(),
            ));
        }
        out.push('\n');
    }

    let summary = &report.summary;
    let score_str = if report.score >= 80 {
        report.score.to_string().green().bold().to_string()
    } else if report.score >= 50 {
        report.score.to_string().yellow().bold().to_string()
    } else {
        report.score.to_string().red().bold().to_string()
    };

    out.push_str(&format!(
        "Score: {score_str}/100  |  {} findings ({} new, {} fixed)\n",
        summary.total, summary.new, summary.fixed,
    ));

    out
}
