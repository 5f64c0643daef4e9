mod cli;

use chrono::{DateTime, Utc};
use cli::{Cli, Commands};
use clap::Parser;
use colored::Colorize;
use shipguard::baseline::Baseline;
use shipguard::config::Config;
use shipguard::hooks::HookHost;
use shipguard::orchestrator::{self, ScanOptions};
use shipguard::output::{self, OutputFormat};
use shipguard::waivers::{Waiver, WaiversFile};
use shipguard::{error::ShipguardError, rules};
use std::path::{Path, PathBuf};

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { path, format, output: output_path, config, baseline } => {
            run_scan_command(&path, &format, output_path.as_deref(), config.as_deref(), baseline.as_deref(), false);
        }
        Commands::Ci { path, format, output: output_path, config, baseline } => {
            run_scan_command(&path, &format, output_path.as_deref(), config.as_deref(), baseline.as_deref(), true);
        }
        Commands::Init { path } => run_init(&path),
        Commands::Waive { rule_id, file, reason, expiry, path, config } => {
            run_waive(&rule_id, &file, &reason, expiry.as_deref(), &path, config.as_deref())
        }
        Commands::Baseline { path, output, config } => run_baseline(&path, &output, config.as_deref()),
        Commands::ListRules => run_list_rules(),
        Commands::Explain { rule_id } => run_explain(&rule_id),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(root: &Path, config_path: Option<&Path>) -> Config {
    Config::load(root, config_path).unwrap_or_else(|e| fail(&e))
}

fn load_baseline(path: Option<&Path>) -> Option<Baseline> {
    path.map(|p| {
        Baseline::read(p).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(2);
        })
    })
}

fn run_scan_command(
    path: &Path,
    format: &OutputFormat,
    output_path: Option<&Path>,
    config_path: Option<&Path>,
    baseline_path: Option<&Path>,
    gate: bool,
) {
    if !path.exists() {
        eprintln!("Error: path does not exist: {}", path.display());
        std::process::exit(2);
    }

    let config = load_config(path, config_path);
    let waivers_path = path.join(&config.waivers_file);
    let waivers = WaiversFile::load(&waivers_path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });
    let baseline = load_baseline(baseline_path);
    let hooks = HookHost::new(Vec::new());
    let options = ScanOptions {
        config: &config,
        waivers: &waivers,
        baseline: baseline.as_ref(),
        hooks: &hooks,
        now: Utc::now(),
    };

    let outcome = orchestrator::run(path, &options).unwrap_or_else(|e| fail(&e));
    let formatted = output::format_report(&outcome.report, format);
    write_output(&formatted, output_path);

    if !gate {
        std::process::exit(0);
    }

    match orchestrator::evaluate_ci_gate(&outcome, &config) {
        Ok(()) => std::process::exit(0),
        Err(failure) => {
            eprintln!("{} {}", "CI gate failed:".red().bold(), failure.message);
            std::process::exit(failure.exit_code);
        }
    }
}

fn run_init(path: &Path) {
    let config_path = path.join("shipguard.json");
    if config_path.exists() {
        eprintln!("Error: {} already exists", config_path.display());
        std::process::exit(2);
    }
    let json = serde_json::to_string_pretty(&Config::default()).expect("default config always serializes");
    std::fs::write(&config_path, json).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", config_path.display());
        std::process::exit(2);
    });
    println!("Wrote {}", config_path.display());
}

fn run_waive(rule_id: &str, file: &str, reason: &str, expiry: Option<&str>, path: &Path, config_path: Option<&Path>) {
    let config = load_config(path, config_path);
    let expiry: Option<DateTime<Utc>> = expiry.map(|e| {
        DateTime::parse_from_rfc3339(e)
            .unwrap_or_else(|err| {
                eprintln!("Error: invalid --expiry '{e}': {err}");
                std::process::exit(2);
            })
            .with_timezone(&Utc)
    });

    let waivers_path = path.join(&config.waivers_file);
    let mut waivers = WaiversFile::load(&waivers_path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });

    waivers.add(Waiver { rule_id: rule_id.to_string(), file: file.to_string(), reason: reason.to_string(), expiry });
    waivers.save(&waivers_path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });

    println!("Waived {rule_id} for {file} in {}", waivers_path.display());
}

fn run_baseline(path: &Path, output_path: &PathBuf, config_path: Option<&Path>) {
    let config = load_config(path, config_path);
    let waivers_path = path.join(&config.waivers_file);
    let waivers = WaiversFile::load(&waivers_path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });
    let hooks = HookHost::new(Vec::new());
    let options =
        ScanOptions { config: &config, waivers: &waivers, baseline: None, hooks: &hooks, now: Utc::now() };

    let outcome = orchestrator::run(path, &options).unwrap_or_else(|e| fail(&e));
    let baseline = Baseline::from_findings(&outcome.report.findings);
    baseline.write(output_path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });
    println!(
        "Wrote baseline with {} finding(s) to {}",
        baseline.keys.len(),
        output_path.display()
    );
}

fn run_list_rules() {
    let config = Config::default();
    println!("{}", "Built-in Rules".bold().underline());
    println!();
    for rule in rules::all_rules() {
        let severity = config.severity_for(rule.id());
        println!("  [{:<8}] {:<25} {}", severity.to_string().to_uppercase(), rule.id(), rule.description());
    }
    println!();
    println!("  Total: {} rules", rules::all_rules().len());
}

fn run_explain(rule_id: &str) {
    let config = Config::default();
    match rules::all_rules().into_iter().find(|r| r.id() == rule_id) {
        Some(rule) => {
            println!("{}", rule.id().bold());
            println!();
            println!("  Default severity:  {}", config.severity_for(rule.id()));
            println!("  Description:       {}", rule.description());
        }
        None => {
            eprintln!("Unknown rule: {rule_id}");
            eprintln!("Use 'shipguard list-rules' to see all available rules.");
            std::process::exit(2);
        }
    }
}

fn write_output(formatted: &str, output_path: Option<&Path>) {
    match output_path {
        Some(out_path) => {
            std::fs::write(out_path, formatted).unwrap_or_else(|e| {
                eprintln!("Error writing output: {e}");
                std::process::exit(2);
            });
            eprintln!("Output written to {}", out_path.display());
        }
        None => print!("{formatted}"),
    }
}

fn fail(error: &ShipguardError) -> ! {
    eprintln!("Error: {error}");
    std::process::exit(error.exit_code());
}
