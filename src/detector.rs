//! Framework-shape detection (C1).
//!
//! Before any file is scanned, [`detect`] validates that the target
//! directory actually looks like the supported app-router framework. This
//! mirrors the teacher's fail-fast directory sniffing in `main.rs`
//! (`find_skill_dirs`/`SKILL.md` check) — give the caller one clear reason
//! rather than cascading confusing per-file failures.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Outcome of a successful detection.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Absolute path to the app directory (`./app` or `./src/app`).
    pub app_dir: PathBuf,
    pub has_route_handlers: bool,
    pub has_server_actions: bool,
    /// The `next` version string as written in `package.json`, if present.
    pub next_version_hint: Option<String>,
}

static ROUTE_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|/)route\.(ts|tsx|js|jsx)$").unwrap()
});

static SOURCE_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(ts|tsx|js|jsx)$").unwrap()
});

/// Validates the project root and locates the app directory.
///
/// Returns `Err(reason)` with the exact single-line message spec §4.1
/// prescribes, so callers can surface it verbatim as a fatal detector error.
pub fn detect(root: &Path) -> Result<Detection, String> {
    let package_json_path = root.join("package.json");
    if !package_json_path.exists() {
        return Err("package.json not found".to_string());
    }

    let content = std::fs::read_to_string(&package_json_path)
        .map_err(|e| format!("Failed to parse package.json: {e}"))?;
    let pkg: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse package.json: {e}"))?;

    let next_version_hint = next_dependency_version(&pkg);
    if next_version_hint.is_none() {
        return Err("next dependency not found".to_string());
    }

    let app_dir = if root.join("app").is_dir() {
        root.join("app")
    } else if root.join("src").join("app").is_dir() {
        root.join("src").join("app")
    } else {
        return Err("app/ directory not found".to_string());
    };

    let files = walk_files(&app_dir);
    let has_route_handlers = files.iter().any(|f| ROUTE_FILE_RE.is_match(&to_posix(f)));
    let has_server_actions = files
        .iter()
        .any(|f| SOURCE_EXT_RE.is_match(&to_posix(f)) && file_has_use_server_directive(f));

    Ok(Detection {
        app_dir,
        has_route_handlers,
        has_server_actions,
        next_version_hint,
    })
}

/// Returns `Some(version_string)` when `next` appears under `dependencies`
/// or `devDependencies`. The version string is empty when the field is
/// present but not a JSON string (still counts as "found" per spec §4.1,
/// which only requires presence).
fn next_dependency_version(pkg: &serde_json::Value) -> Option<String> {
    let entry = pkg
        .get("dependencies")
        .and_then(|d| d.get("next"))
        .or_else(|| pkg.get("devDependencies").and_then(|d| d.get("next")))?;
    Some(entry.as_str().unwrap_or_default().to_string())
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// True when a POSIX-relative path looks like an app-router route handler
/// file, e.g. `app/api/users/route.ts`. Shared with [`crate::rules`], which
/// classifies files the same way the detector does.
pub(crate) fn is_route_handler_path(posix_path: &str) -> bool {
    ROUTE_FILE_RE.is_match(posix_path)
}

/// True iff the file's first non-whitespace, non-comment tokens include the
/// literal directive `"use server"`.
///
/// Only the leading run of blank lines and `//`/`/* */` comments is
/// inspected — a `"use server"` string appearing later in the file (e.g.
/// inside a template literal) is not a directive.
fn file_has_use_server_directive(path: &Path) -> bool {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return false,
    };
    leading_directive_is_use_server(&content)
}

pub(crate) fn leading_directive_is_use_server(content: &str) -> bool {
    let mut rest = content;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return false;
        }
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.split_once('\n').map(|(_, r)| r).unwrap_or("");
            continue;
        }
        if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map(|(_, r)| r).unwrap_or("");
            continue;
        }
        break;
    }
    rest.starts_with("\"use server\"") || rest.starts_with("'use server'")
}
