//! Source probes (C3): pure, conservative textual detectors over one file's
//! text. Probes never see more than a single file and never produce a
//! [`Finding`](crate::finding::Finding) directly — [`crate::rules`] combines
//! their outputs into rule firings.
//!
//! Every probe is tuned against identifier-prefix collisions the way the
//! teacher's `bash_patterns`/`prompt` regexes are (see their comments on
//! `\b` boundaries and the `domain_is_allowed` subdomain check): `fetch(`
//! must fire, `fetchUser(`, `prefetch(`, `refetch(` must not.

use crate::config::Hints;
use regex::Regex;
use std::sync::LazyLock;

/// True iff any name in `hints.auth.functions` appears as a call target.
pub fn has_auth_call(src: &str, hints: &Hints) -> bool {
    any_identifier_called(src, &hints.auth.functions)
}

/// True iff any name in `hints.rateLimit.wrappers` appears as a call target.
pub fn has_rate_limit_call(src: &str, hints: &Hints) -> bool {
    any_identifier_called(src, &hints.rate_limit.wrappers)
}

/// True iff a query-builder `where` object literal references any name in
/// `hints.tenancy.orgFieldNames`.
pub fn has_tenant_scope(src: &str, hints: &Hints) -> bool {
    where_clause_bodies(src)
        .iter()
        .any(|body| hints.tenancy.org_field_names.iter().any(|f| references_field(body, f)))
}

/// True iff any `where:` object literal is present at all (used by
/// `tenancy-missing`'s "applies to" guard, independent of which field
/// satisfies it).
pub fn has_where_clause(src: &str) -> bool {
    !where_clause_bodies(src).is_empty()
}

/// True iff the source calls `.create(`, `.update(`, `.delete(`, or
/// `.upsert(` on some identifier that is not itself an outbound-fetch
/// target — i.e. a data-store mutation, not an HTTP client method that
/// happens to share a name.
pub fn has_data_mutation(src: &str) -> bool {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b([A-Za-z_$][\w$]*)\s*\.\s*(create|update|delete|upsert)\s*\(").unwrap()
    });
    RE.captures_iter(src)
        .any(|c| !is_fetch_like_identifier(&c[1]))
}

fn is_fetch_like_identifier(name: &str) -> bool {
    matches!(name, "fetch" | "axios" | "got" | "undici")
}

/// Returns `true` if `ident` is referenced as a call target (`ident(`),
/// honoring identifier boundaries: `auth(` matches, `authFoo(`/`fooAuth(`
/// never do, since [`Regex`] requires whitespace-then-`(` directly after
/// the full identifier and a word boundary directly before it.
fn any_identifier_called(src: &str, idents: &[String]) -> bool {
    if idents.is_empty() {
        return false;
    }
    let alternation = idents
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(re) = Regex::new(&format!(r"\b(?:{alternation})\s*\(")) else {
        return false;
    };
    re.is_match(src)
}

/// Returns true when `field` is referenced inside a `where` object body,
/// as a bare key (`orgId:`) or via a property access chain ending in it
/// (`session.orgId`).
fn references_field(where_body: &str, field: &str) -> bool {
    let escaped = regex::escape(field);
    let key_re = Regex::new(&format!(r"\b{escaped}\s*:")).unwrap();
    let access_re = Regex::new(&format!(r"\.\s*{escaped}\b")).unwrap();
    key_re.is_match(where_body) || access_re.is_match(where_body)
}

/// Extracts the bodies of every `where: { ... }` object literal in `src`,
/// tracking brace depth by hand (no real parser) so nested objects inside
/// the where-clause don't truncate the match early.
fn where_clause_bodies(src: &str) -> Vec<String> {
    static WHERE_START: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\bwhere\s*:\s*\{").unwrap());

    let mut bodies = Vec::new();
    for m in WHERE_START.find_iter(src) {
        let open_brace = m.end() - 1;
        if let Some(body) = extract_braced_body(src, open_brace) {
            bodies.push(body);
        }
    }
    bodies
}

/// Given the byte index of an opening `{`, returns the text strictly
/// between it and its matching `}`.
fn extract_braced_body(src: &str, open_brace_idx: usize) -> Option<String> {
    let bytes = src.as_bytes();
    let mut depth = 0i32;
    let mut i = open_brace_idx;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(src[open_brace_idx + 1..i].to_string());
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Result of [`detect_outbound_fetcher`].
#[derive(Debug, Clone, Default)]
pub struct OutboundFetchResult {
    pub has_outbound_fetch: bool,
    pub has_user_influenced_url: bool,
    pub evidence: Vec<String>,
    /// 1-based line number of the first risky call site, if any.
    pub line: Option<usize>,
}

impl OutboundFetchResult {
    pub fn is_risky(&self) -> bool {
        self.has_outbound_fetch && self.has_user_influenced_url
    }
}

/// A single outbound-HTTP call site: its callee name, the raw text of its
/// argument list, and the byte offset where the callee starts (for line
/// number reporting).
struct CallSite {
    callee: String,
    args: String,
    start: usize,
}

static FETCH_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfetch\s*\(").unwrap());
static AXIOS_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\baxios\.(\w+)\s*\(").unwrap());
static GOT_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bgot\s*\(").unwrap());
static UNDICI_REQUEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bundici\.request\s*\(").unwrap());
static UNDICI_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+(?:(\w+)\s*,?\s*)?(?:\{([^}]*)\})?\s*from\s*['"]undici['"]"#).unwrap()
});

/// Detects calls to `fetch(`, `axios.<method>(`, `got(`, `undici.request(`,
/// or a locally-bound name imported from `undici`, and whether a
/// user-controlled value flows into any of their arguments.
pub fn detect_outbound_fetcher(src: &str) -> OutboundFetchResult {
    let call_sites = find_call_sites(src);
    let has_outbound_fetch = !call_sites.is_empty();

    let tainted_idents = tainted_identifiers(src);
    let mut evidence = Vec::new();
    let mut line = None;
    let mut has_user_influenced_url = false;

    for site in &call_sites {
        if let Some(label) = taint_label_in(&site.args, &tainted_idents) {
            has_user_influenced_url = true;
            evidence.push(format!("{}() with {}-derived argument", site.callee, label));
            if line.is_none() {
                line = Some(byte_offset_to_line(src, site.start));
            }
        }
    }

    OutboundFetchResult {
        has_outbound_fetch,
        has_user_influenced_url,
        evidence,
        line,
    }
}

/// Converts a byte offset into a 1-based line number.
pub fn byte_offset_to_line(src: &str, offset: usize) -> usize {
    src.as_bytes()[..offset.min(src.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

fn find_call_sites(src: &str) -> Vec<CallSite> {
    let mut sites = Vec::new();

    for m in FETCH_BARE.find_iter(src) {
        if let Some(args) = args_after(src, m.end() - 1) {
            sites.push(CallSite { callee: "fetch".to_string(), args, start: m.start() });
        }
    }
    for c in AXIOS_METHOD.captures_iter(src) {
        let m = c.get(0).unwrap();
        if let Some(args) = args_after(src, m.end() - 1) {
            sites.push(CallSite {
                callee: format!("axios.{}", &c[1]),
                args,
                start: m.start(),
            });
        }
    }
    for m in GOT_BARE.find_iter(src) {
        if let Some(args) = args_after(src, m.end() - 1) {
            sites.push(CallSite { callee: "got".to_string(), args, start: m.start() });
        }
    }
    for m in UNDICI_REQUEST.find_iter(src) {
        if let Some(args) = args_after(src, m.end() - 1) {
            sites.push(CallSite { callee: "undici.request".to_string(), args, start: m.start() });
        }
    }
    for ident in undici_bound_identifiers(src) {
        let Ok(re) = Regex::new(&format!(r"\b{}\s*\(", regex::escape(&ident))) else {
            continue;
        };
        for m in re.find_iter(src) {
            if let Some(args) = args_after(src, m.end() - 1) {
                sites.push(CallSite { callee: ident.clone(), args, start: m.start() });
            }
        }
    }

    sites.sort_by_key(|s| s.start);
    sites
}

/// Identifiers locally bound from the `undici` module (default import or
/// named import, with or without an `as` alias).
fn undici_bound_identifiers(src: &str) -> Vec<String> {
    let mut idents = Vec::new();
    for c in UNDICI_IMPORT.captures_iter(src) {
        if let Some(default_name) = c.get(1) {
            idents.push(default_name.as_str().to_string());
        }
        if let Some(named) = c.get(2) {
            for part in named.as_str().split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let bound = part
                    .split_whitespace()
                    .last()
                    .unwrap_or(part)
                    .to_string();
                idents.push(bound);
            }
        }
    }
    idents
}

/// Given the byte index of an opening `(`, returns the text strictly
/// between it and its matching `)`.
fn args_after(src: &str, open_paren_idx: usize) -> Option<String> {
    let bytes = src.as_bytes();
    let mut depth = 0i32;
    let mut i = open_paren_idx;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(src[open_paren_idx + 1..i].to_string());
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

static REQUEST_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\brequest\.url\b").unwrap());
static REQ_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\breq\.url\b").unwrap());
static REQUEST_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bawait\s+request\.json\s*\(\s*\)").unwrap());
static REQ_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bawait\s+req\.json\s*\(\s*\)").unwrap());
static PARAMS_DESTRUCTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let|var)\s*\{\s*([^}]*)\}\s*=\s*params\b").unwrap()
});
static VAR_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*([^;\n]*)").unwrap()
});

/// Maps each locally tainted identifier to the human-readable label of the
/// taint source it was derived from.
fn tainted_identifiers(src: &str) -> Vec<(String, &'static str)> {
    let mut tainted = Vec::new();

    for c in PARAMS_DESTRUCTURE.captures_iter(src) {
        for name in c[1].split(',') {
            let name = name.split(':').next().unwrap_or(name).trim();
            if !name.is_empty() {
                tainted.push((name.to_string(), "params"));
            }
        }
    }

    for c in VAR_ASSIGNMENT.captures_iter(src) {
        let (name, rhs) = (&c[1], &c[2]);
        let label = if REQUEST_URL.is_match(rhs) {
            Some("request.url")
        } else if REQ_URL.is_match(rhs) {
            Some("req.url")
        } else {
            None
        };
        if let Some(label) = label {
            tainted.push((name.to_string(), label));
        }
    }

    tainted
}

/// Returns a taint label when `args` (a call's argument-list text) either
/// directly contains a taint-source expression, or references a variable
/// previously bound to one (same-scope heuristic from spec §4.3).
fn taint_label_in(args: &str, tainted_idents: &[(String, &'static str)]) -> Option<&'static str> {
    if REQUEST_URL.is_match(args) {
        return Some("request.url");
    }
    if REQ_URL.is_match(args) {
        return Some("req.url");
    }
    if REQUEST_JSON.is_match(args) {
        return Some("request.json()");
    }
    if REQ_JSON.is_match(args) {
        return Some("req.json()");
    }
    for (ident, label) in tainted_idents {
        let re = Regex::new(&format!(r"\b{}\b", regex::escape(ident))).ok()?;
        if re.is_match(args) {
            return Some(label);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hints;

    #[test]
    fn auth_call_matches_bare_identifier_only() {
        let hints = Hints::default();
        assert!(has_auth_call("const session = await auth();", &hints));
        assert!(!has_auth_call("const x = authorize(1);", &hints));
    }

    #[test]
    fn tenant_scope_requires_configured_field_in_where_clause() {
        let hints = Hints::default();
        let src = "await db.user.findMany({ where: { orgId: session.orgId } })";
        assert!(has_tenant_scope(src, &hints));
        let src_no_scope = "await db.user.findMany({ where: { id: userId } })";
        assert!(!has_tenant_scope(src_no_scope, &hints));
    }

    #[test]
    fn data_mutation_detects_query_builder_writes() {
        assert!(has_data_mutation("await db.user.create({ data })"));
        assert!(!has_data_mutation("const x = fetch.create;"));
    }

    #[test]
    fn outbound_fetch_rejects_identifier_prefix_collisions() {
        assert!(!detect_outbound_fetcher("fetchUser(id)").has_outbound_fetch);
        assert!(!detect_outbound_fetcher("prefetch(url)").has_outbound_fetch);
        assert!(!detect_outbound_fetcher("refetch(url)").has_outbound_fetch);
        assert!(detect_outbound_fetcher("fetch(url)").has_outbound_fetch);
    }

    #[test]
    fn ssrf_via_query_param_is_detected_through_variable_assignment() {
        let src = r#"
            const url = new URL(request.url).searchParams.get("target");
            await fetch(url);
        "#;
        let result = detect_outbound_fetcher(src);
        assert!(result.is_risky());
        assert!(result.evidence.iter().any(|e| e.contains("fetch(") && e.contains("request.url")));
    }

    #[test]
    fn hardcoded_fetch_url_is_not_risky() {
        let src = r#"await fetch("https://api.example.com");"#;
        let result = detect_outbound_fetcher(src);
        assert!(result.has_outbound_fetch);
        assert!(!result.is_risky());
    }

    #[test]
    fn undici_named_import_with_alias_is_tracked() {
        let src = r#"
            import { request as doRequest } from 'undici';
            await doRequest(req.url);
        "#;
        let result = detect_outbound_fetcher(src);
        assert!(result.is_risky());
    }
}
