use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn shipguard() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("shipguard")
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn package_json(dir: &Path) {
    write(dir, "package.json", r#"{"dependencies": {"next": "14.2.0"}}"#);
}

// ── scan: core scenarios (spec §8) ──────────────────────────────────────────

#[test]
fn scan_protected_route_has_no_auth_finding() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  const session = await getServerSession();\n  if (!session) return new Response('unauthorized', { status: 401 });\n  return Response.json({ ok: true });\n}\n",
    );

    let output = shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = parsed["findings"].as_array().unwrap();
    assert!(
        findings.iter().all(|f| f["rule_id"] != "auth-missing"),
        "expected no auth-missing finding, got {findings:#?}"
    );
}

#[test]
fn scan_unprotected_route_reports_auth_missing() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  return Response.json({ ok: true });\n}\n",
    );

    let output = shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = parsed["findings"].as_array().unwrap();
    assert!(findings.iter().any(|f| f["rule_id"] == "auth-missing"));
}

#[test]
fn scan_payment_checkout_without_auth_is_critical() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/checkout/route.ts",
        "export async function POST(request) {\n  const body = await request.json();\n  const intent = await stripe.paymentIntents.create({ amount: body.amount });\n  return Response.json(intent);\n}\n",
    );

    let output = shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = parsed["findings"].as_array().unwrap();
    let hit = findings
        .iter()
        .find(|f| f["rule_id"] == "unauth-payment-intent")
        .expect("expected an unauth-payment-intent finding");
    assert_eq!(hit["severity"], "critical");
}

#[test]
fn scan_ssrf_via_query_param_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/proxy/route.ts",
        "export async function GET(request) {\n  const session = await getServerSession();\n  const url = request.url;\n  return fetch(url);\n}\n",
    );

    let output = shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = parsed["findings"].as_array().unwrap();
    assert!(findings.iter().any(|f| f["rule_id"] == "ssrf-user-url"));
}

#[test]
fn scan_hardcoded_fetch_url_is_not_flagged_as_ssrf() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/status/route.ts",
        "export async function GET() {\n  const session = await getServerSession();\n  const res = await fetch('https://status.example.com/health');\n  return Response.json(await res.json());\n}\n",
    );

    let output = shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = parsed["findings"].as_array().unwrap();
    assert!(findings.iter().all(|f| f["rule_id"] != "ssrf-user-url"));
}

#[test]
fn scan_waived_finding_is_suppressed_from_active_findings() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  return Response.json({ ok: true });\n}\n",
    );

    shipguard()
        .args([
            "waive",
            "auth-missing",
            "--file",
            "app/api/users/route.ts",
            "--reason",
            "internal tool, fronted by the mesh gateway",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    let output = shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed["findings"].as_array().unwrap().iter().all(|f| f["rule_id"] != "auth-missing"));
    assert!(parsed["waivedFindings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["rule_id"] == "auth-missing"));
}

// ── determinism (invariant 1) ───────────────────────────────────────────────

#[test]
fn scan_finding_order_is_identical_across_runs() {
    // Everything but `timestamp` must match byte-for-byte between two
    // otherwise-identical scans, since ordering comes from a parallel file
    // walk that must be sorted back into (rule_id, file, line, column) order.
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(dir.path(), "app/api/a/route.ts", "export async function GET() { return fetch(request.url); }\n");
    write(dir.path(), "app/api/b/route.ts", "export async function GET() { return Response.json({}); }\n");
    write(dir.path(), "app/api/c/route.ts", "export async function GET() { const s = await getServerSession(); return Response.json({}); }\n");

    let first = shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    let second = shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();

    let mut first: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    let mut second: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    first["timestamp"] = serde_json::Value::Null;
    second["timestamp"] = serde_json::Value::Null;
    assert_eq!(first, second);
}

// ── ci gate (spec §6 exit codes) ────────────────────────────────────────────

#[test]
fn ci_passes_on_clean_project() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  const session = await getServerSession();\n  return Response.json({ ok: true });\n}\n",
    );

    shipguard()
        .args(["ci", dir.path().to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn ci_fails_exit_11_on_high_severity_finding() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  return Response.json({ ok: true });\n}\n",
    );

    shipguard()
        .args(["ci", dir.path().to_str().unwrap()])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("CI gate failed"));
}

#[test]
fn ci_fails_exit_12_on_new_critical_finding() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  return Response.json({ ok: true });\n}\n",
    );

    // auth-missing fires at Medium confidence; bump its configured severity
    // to critical but raise the gate's confidence floor above Medium so the
    // severity+confidence gate (exit 11) does not trip, isolating the
    // new-critical cap (exit 12) as the only failing condition.
    write(
        dir.path(),
        "shipguard.json",
        r#"{"rules": {"auth-missing": {"severity": "critical", "allow": []}}, "ci": {"failOn": "critical", "minConfidence": "high", "minScore": 0, "maxNewCritical": 0}}"#,
    );

    shipguard()
        .args(["ci", dir.path().to_str().unwrap()])
        .assert()
        .code(12);
}

// ── exit code 2/3 for structural problems ───────────────────────────────────

#[test]
fn scan_nonexistent_path_exits_2() {
    shipguard()
        .args(["scan", "/does/not/exist/at/all"])
        .assert()
        .code(2);
}

#[test]
fn scan_missing_package_json_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    shipguard()
        .args(["scan", dir.path().to_str().unwrap()])
        .assert()
        .code(3);
}

// ── output formats ───────────────────────────────────────────────────────────

#[test]
fn scan_sarif_format_is_valid_sarif_2_1_0() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  return Response.json({ ok: true });\n}\n",
    );

    shipguard()
        .args(["scan", dir.path().to_str().unwrap(), "--format", "sarif"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": \"2.1.0\""))
        .stdout(predicate::str::contains("auth-missing"));
}

#[test]
fn scan_pretty_format_prints_score_line() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  const session = await getServerSession();\n  return Response.json({ ok: true });\n}\n",
    );

    shipguard()
        .args(["scan", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score:"));
}

// ── CLI presentation commands ───────────────────────────────────────────────

#[test]
fn list_rules_shows_every_rule() {
    shipguard()
        .args(["list-rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auth-missing"))
        .stdout(predicate::str::contains("rate-limit-missing"))
        .stdout(predicate::str::contains("tenancy-missing"))
        .stdout(predicate::str::contains("ssrf-user-url"))
        .stdout(predicate::str::contains("unauth-payment-intent"));
}

#[test]
fn explain_known_rule_succeeds() {
    shipguard()
        .args(["explain", "auth-missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auth-missing"))
        .stdout(predicate::str::contains("Default severity"));
}

#[test]
fn explain_unknown_rule_exits_2() {
    shipguard()
        .args(["explain", "nonexistent-rule"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown rule"));
}

// ── init / baseline ──────────────────────────────────────────────────────────

#[test]
fn init_writes_default_config_and_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    shipguard().args(["init", dir.path().to_str().unwrap()]).assert().success();
    assert!(dir.path().join("shipguard.json").exists());

    shipguard()
        .args(["init", dir.path().to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn baseline_then_rescan_marks_no_new_findings() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  return Response.json({ ok: true });\n}\n",
    );

    let baseline_path = dir.path().join(".shipguard-baseline.json");
    shipguard()
        .args([
            "baseline",
            dir.path().to_str().unwrap(),
            "--output",
            baseline_path.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(baseline_path.exists());

    let output = shipguard()
        .args([
            "scan",
            dir.path().to_str().unwrap(),
            "--format",
            "json",
            "--baseline",
            baseline_path.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["summary"]["new"], 0);
}

#[test]
fn output_to_file_writes_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    package_json(dir.path());
    write(
        dir.path(),
        "app/api/users/route.ts",
        "export async function GET(request) {\n  const session = await getServerSession();\n  return Response.json({ ok: true });\n}\n",
    );

    let output_file = dir.path().join("report.json");
    shipguard()
        .args([
            "scan",
            dir.path().to_str().unwrap(),
            "--format",
            "json",
            "--output",
            output_file.to_str().unwrap(),
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&output_file).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert!(parsed["score"].is_i64());
}
