//! File enumeration with include/exclude globs (C2).
//!
//! Glob grammar (spec §4.2): `*` matches any run of non-separator
//! characters, `**` matches any run of characters including separators,
//! every other regex metacharacter is escaped. Translated by hand into a
//! `regex::Regex`, in the same spirit as the teacher's bespoke
//! pattern-building in `bash_patterns.rs`/`prompt.rs` rather than pulling in
//! a dedicated glob crate for a handful of translation rules.

use regex::Regex;
use std::path::Path;

/// Walks `root` and returns every regular file, relative to `root`, whose
/// POSIX-normalized path matches at least one `include` glob and no
/// `exclude` glob.
pub fn enumerate_files(root: &Path, include: &[String], exclude: &[String]) -> Vec<String> {
    let include_res: Vec<Regex> = include.iter().map(|g| glob_to_regex(g)).collect();
    let exclude_res: Vec<Regex> = exclude.iter().map(|g| glob_to_regex(g)).collect();

    let mut matched: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            let posix = to_posix(relative);
            let included = include_res.iter().any(|re| re.is_match(&posix));
            let excluded = exclude_res.iter().any(|re| re.is_match(&posix));
            (included && !excluded).then_some(posix)
        })
        .collect();

    matched.sort();
    matched
}

/// Returns `true` when `path` (already POSIX-normalized) matches `glob`.
///
/// Used by per-rule allowlists in [`crate::rules`], which test a single
/// path against a small list of globs rather than walking a directory.
pub fn glob_matches(glob: &str, posix_path: &str) -> bool {
    glob_to_regex(glob).is_match(posix_path)
}

/// Normalizes a path to forward slashes for glob matching, regardless of
/// the host platform's native separator.
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Translates a glob pattern into an anchored regex.
///
/// Supports `*`, `**`, and brace alternation (`{a,b,c}`) since the spec's
/// default include set (`route.{ts,tsx,js,jsx}`) depends on it; all other
/// regex metacharacters are escaped literally.
fn glob_to_regex(glob: &str) -> Regex {
    let mut pattern = String::from("^");
    let chars: Vec<char> = glob.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    pattern.push_str(".*");
                    i += 2;
                } else {
                    pattern.push_str("[^/]*");
                    i += 1;
                }
            }
            '{' => {
                // Brace alternation: {a,b,c} -> (?:a|b|c), with each
                // alternative's own metacharacters escaped.
                if let Some(end) = chars[i..].iter().position(|&c| c == '}') {
                    let inner: String = chars[i + 1..i + end].iter().collect();
                    let alts: Vec<String> = inner
                        .split(',')
                        .map(|s| regex::escape(s.trim()))
                        .collect();
                    pattern.push_str("(?:");
                    pattern.push_str(&alts.join("|"));
                    pattern.push(')');
                    i += end + 1;
                } else {
                    pattern.push_str(&regex::escape("{"));
                    i += 1;
                }
            }
            c => {
                pattern.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    pattern.push('$');
    Regex::new(&pattern).unwrap_or_else(|_| Regex::new("$^").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn double_star_matches_across_directories() {
        let re = glob_to_regex("app/**/route.ts");
        assert!(re.is_match("app/api/users/route.ts"));
        assert!(re.is_match("app/route.ts"));
        assert!(!re.is_match("app/api/users/route.js"));
    }

    #[test]
    fn single_star_does_not_cross_separators() {
        let re = glob_to_regex("app/*/route.ts");
        assert!(re.is_match("app/api/route.ts"));
        assert!(!re.is_match("app/api/users/route.ts"));
    }

    #[test]
    fn brace_alternation_expands_extensions() {
        assert!(glob_matches("app/**/route.{ts,tsx,js,jsx}", "app/api/route.tsx"));
        assert!(!glob_matches("app/**/route.{ts,tsx,js,jsx}", "app/api/route.py"));
    }

    #[test]
    fn regex_metacharacters_in_glob_are_literal() {
        assert!(glob_matches("app/a.b+c/file.ts", "app/a.b+c/file.ts"));
        assert!(!glob_matches("app/a.b+c/file.ts", "app/aXbbc/file.ts"));
    }

    #[test]
    fn enumerate_respects_include_and_exclude() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "app/api/users/route.ts");
        write(tmp.path(), "app/api/users/route.test.ts");
        write(tmp.path(), "app/api/users/helper.ts");

        let include = vec!["app/**/route.{ts,tsx,js,jsx}".to_string()];
        let exclude = vec!["**/*.test.*".to_string()];
        let files = enumerate_files(tmp.path(), &include, &exclude);

        assert_eq!(files, vec!["app/api/users/route.ts".to_string()]);
    }

    #[test]
    fn enumerate_output_is_sorted_for_determinism() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "app/b/route.ts");
        write(tmp.path(), "app/a/route.ts");
        let include = vec!["app/**/route.ts".to_string()];
        let files = enumerate_files(tmp.path(), &include, &[]);
        assert_eq!(files, vec!["app/a/route.ts".to_string(), "app/b/route.ts".to_string()]);
    }
}
