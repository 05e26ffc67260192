//! URL value + normaliser (component C1, `spec.md` §4.1).
//!
//! Ported from `examples/original_source/linkcheck/url.py` (`url_norm`,
//! `url_fix_host`, `collapse_segments`, `url_parse_query`,
//! `url_fix_wayback_query`, `urlunsplit`).

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Res, ResExt};

/// `url.py:_nopathquote_chars`.
const PATH_SAFE: &str = "-;/=,~*+()@!";
/// `url.py:url_norm`, anchor re-quote safe set.
const FRAGMENT_SAFE: &str = "!$&'()*+,-./;=?@_~";

const DEFAULT_PORTS: &[(&str, u16)] = &[("http", 80), ("https", 443), ("ftp", 21)];

fn default_port(scheme: &str) -> Option<u16> {
    DEFAULT_PORTS
        .iter()
        .find(|(s, _)| *s == scheme)
        .map(|(_, p)| *p)
}

fn ascii_set_except(safe: &str) -> AsciiSet {
    let mut set = CONTROLS;
    for b in 0u8..=127 {
        let c = b as char;
        if c.is_ascii_alphanumeric() || safe.contains(c) {
            continue;
        }
        set = set.add(b);
    }
    set
}

fn quote_with_safe(s: &str, safe: &str) -> String {
    let set = ascii_set_except(safe);
    utf8_percent_encode(s, &set).to_string()
}

pub(crate) fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

static WAYBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?)(%3A/|:/)").unwrap());

/// `url.py:url_fix_wayback_query` — restore `https?%3A/` or `https?:/`
/// (single slash, meaning the tidying above over-collapsed a wayback
/// machine embedded URL) back to `https?://`.
fn fix_wayback(path: &str) -> String {
    WAYBACK_RE.replace_all(path, "$1://").into_owned()
}

/// `url.py:collapse_segments` — remove redundant `.`/`..` path segments.
/// Backslashes are normalised to `/` first (deliberately, against strict
/// RFC 3986, to defang Windows-style parent-dir traversal).
pub(crate) fn collapse_segments(path: &str) -> String {
    let path = path.replace('\\', "/");
    // shrink multiple slashes to one
    let mut squeezed = String::with_capacity(path.len());
    let mut last_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !last_was_slash {
                squeezed.push(c);
            }
            last_was_slash = true;
        } else {
            squeezed.push(c);
            last_was_slash = false;
        }
    }
    let path = squeezed;

    let absolute = path.starts_with('/');
    let trailing_slash = path.len() > 1 && path.ends_with('/');
    let mut stack: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                if stack.last().is_some_and(|s| *s != "..") {
                    stack.pop();
                } else if !absolute {
                    stack.push("..");
                }
                // absolute: drop, cannot go above root
            }
            other => stack.push(other),
        }
    }
    let mut result = String::new();
    if absolute {
        result.push('/');
    }
    result.push_str(&stack.join("/"));
    if trailing_slash && !result.ends_with('/') {
        result.push('/');
    }
    if result.is_empty() {
        result.push_str(if absolute { "/" } else { "" });
    }
    result
}

/// One parsed query parameter: `url.py:parse_qsl`'s `(key, value, sep)`
/// triples, `sep` being the delimiter that followed this pair (`&`, `;`
/// or empty for the last one).
#[derive(Debug, Clone)]
pub(crate) struct QueryParam {
    pub(crate) key: String,
    pub(crate) value: Option<String>,
    pub(crate) sep: char,
}

fn parse_qsl(qs: &str) -> Vec<QueryParam> {
    if qs.is_empty() {
        return Vec::new();
    }
    let mut pairs: Vec<(String, char)> = Vec::new();
    for name_value in qs.split('&') {
        if name_value.contains(';') {
            let parts: Vec<&str> = name_value.split(';').collect();
            for p in &parts[..parts.len() - 1] {
                pairs.push((p.to_string(), ';'));
            }
            pairs.push((parts[parts.len() - 1].to_string(), '&'));
        } else {
            pairs.push((name_value.to_string(), '&'));
        }
    }
    if let Some(last) = pairs.last_mut() {
        last.1 = '\0';
    }
    let mut out = Vec::new();
    for (nv, sep) in pairs {
        let sep = if sep == '\0' { '\0' } else { sep };
        if let Some((k, v)) = nv.split_once('=') {
            out.push(QueryParam {
                key: decode(&k.replace('+', " ")),
                value: Some(decode(&v.replace('+', " "))),
                sep,
            });
        } else {
            out.push(QueryParam {
                key: decode(&nv.replace('+', " ")),
                value: None,
                sep,
            });
        }
    }
    out
}

/// `url.py:url_parse_query` — re-quote a query string, preserving `&`
/// vs `;` separators, a missing `=` (`k&`), and an explicit empty value
/// (`k=&`).
pub(crate) fn normalize_query(query: &str) -> String {
    // msdn.microsoft.com style: a literal '?' embedded inside the query
    if let Some(idx) = query.rfind('?') {
        let (head, rest) = query.split_at(idx);
        let rest = &rest[1..];
        return format!("{}?{}", normalize_query(head), normalize_query(rest));
    }
    let params = parse_qsl(query);
    let mut out = String::new();
    for p in params {
        let k = quote_with_safe(&p.key, "/-:,;");
        let sep = if p.sep == '\0' { "" } else { &p.sep.to_string() };
        match &p.value {
            Some(v) if !v.is_empty() => {
                let v = quote_with_safe(v, "/-:,;");
                out.push_str(&format!("{}={}{}", k, v, sep));
            }
            Some(_) => {
                // present but empty: some sites need the literal `=`
                out.push_str(&format!("{}={}", k, sep));
            }
            None => {
                out.push_str(&format!("{}{}", k, sep));
            }
        }
    }
    out
}

/// The seven normalised URL components (`spec.md` §3 `URLParts`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UrlParts {
    pub(crate) scheme: String,
    pub(crate) userinfo: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) fragment: String,
}

impl UrlParts {
    pub(crate) fn netloc(&self) -> String {
        let mut s = String::new();
        if let Some(ui) = &self.userinfo {
            s.push_str(ui);
            s.push('@');
        }
        if let Some(h) = &self.host {
            s.push_str(h);
        }
        if let Some(p) = self.port {
            if default_port(&self.scheme) != Some(p) {
                s.push(':');
                s.push_str(&p.to_string());
            }
        }
        s
    }

    /// Re-emit as a single string (`url.py:urlunsplit`, with the UNC
    /// `file:////server/path` special case).
    pub(crate) fn to_url_string(&self) -> String {
        let netloc = self.netloc();
        let mut out = String::new();
        out.push_str(&self.scheme);
        out.push(':');
        if !netloc.is_empty() || self.scheme == "file" {
            out.push_str("//");
            out.push_str(&netloc);
            if !self.path.is_empty() && !self.path.starts_with('/') {
                out.push('/');
            }
        }
        out.push_str(&self.path);
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query);
        }
        if !self.fragment.is_empty() {
            out.push('#');
            out.push_str(&self.fragment);
        }
        out
    }
}

/// Result of §4.1 normalisation: the canonical string, its parsed parts,
/// and whether IDNA re-encoding changed the host.
pub(crate) struct Normalized {
    pub(crate) url: String,
    pub(crate) parts: UrlParts,
    pub(crate) is_idn: bool,
    /// Leading/trailing whitespace was present in the raw string —
    /// reported as a warning by the caller, §4.1 rule 1.
    pub(crate) had_whitespace: bool,
}

impl Normalized {
    /// `cache_url`: the fingerprint used for dedup (§3, §4.5) — the
    /// normalised URL with the fragment stripped.
    pub(crate) fn cache_url(&self) -> String {
        let mut parts = self.parts.clone();
        parts.fragment.clear();
        parts.to_url_string()
    }
}

fn mailto_split(path: &str) -> (String, String) {
    if let Some((p, q)) = path.split_once('?') {
        (p.to_string(), q.to_string())
    } else {
        (path.to_string(), String::new())
    }
}

/// Resolve `raw` against `parent`/`base_ref` and normalise (`spec.md`
/// §4.1). `parent` is the absolute URL of the referring page; `base_ref`
/// is the value of an HTML `<base href>` if one was seen.
pub(crate) fn normalize(raw: &str, parent: Option<&str>, base_ref: Option<&str>) -> Res<Normalized> {
    let had_whitespace = raw.trim() != raw;
    let trimmed = raw.trim();

    let absolute_base = if is_absolute(trimmed) {
        None
    } else if let Some(b) = base_ref.filter(|b| is_absolute(b)) {
        Some(b)
    } else {
        parent
    };

    let joined = if is_absolute(trimmed) {
        trimmed.to_string()
    } else if let Some(base) = absolute_base {
        join_relative(base, trimmed)?
    } else {
        trimmed.to_string()
    };

    let (scheme, rest) = match joined.split_once(':') {
        Some((s, r)) if is_absolute(&joined) => (s.to_lowercase(), r),
        _ => (String::new(), joined.as_str()),
    };

    if scheme.is_empty() {
        // relative URL with no base to resolve against: normalise only
        // the path/query/fragment portion.
        let parts = parse_relative(rest);
        let url = parts.to_url_string();
        return Ok(Normalized {
            url,
            parts,
            is_idn: false,
            had_whitespace,
        });
    }

    let mut rest = rest;
    // strip leading "//" before netloc if present
    let (has_authority, after_slashes) = if let Some(stripped) = rest.strip_prefix("//") {
        (true, stripped)
    } else {
        (false, rest)
    };

    let (netloc, mut pathqf) = if has_authority {
        match after_slashes.find(['/', '?', '#']) {
            Some(idx) => (&after_slashes[..idx], &after_slashes[idx..]),
            None => (after_slashes, ""),
        }
    } else {
        ("", after_slashes)
    };
    rest = pathqf;
    let _ = &mut pathqf;

    let (path_and_query, fragment) = match rest.split_once('#') {
        Some((p, f)) => (p, f),
        None => (rest, ""),
    };
    let (mut path, mut query) = match path_and_query.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (path_and_query.to_string(), String::new()),
    };

    if scheme == "mailto" {
        let (p, q) = mailto_split(&path);
        path = p;
        if query.is_empty() {
            query = q;
        }
    }

    let (userinfo, hostport) = match netloc.rsplit_once('@') {
        Some((ui, hp)) => (Some(decode(ui)), hp),
        None => (None, netloc),
    };

    let mut is_idn = false;
    let (host, port) = if hostport.is_empty() {
        (None, None)
    } else {
        let decoded = decode(hostport).to_lowercase();
        let (host_part, port_part) = split_host_port(&decoded);
        let host_part = host_part.trim_end_matches('.').to_string();
        let (encoded_host, idn_changed) = idna_encode(&host_part);
        is_idn = idn_changed;
        (Some(encoded_host), port_part)
    };
    if !path.is_empty() {
        path = collapse_segments(&decode(&path));
    } else if host.is_some() && (!query.is_empty() || !fragment.is_empty()) {
        path = "/".to_string();
    }

    query = normalize_query(&query);
    let fragment_decoded = decode(fragment);

    let mut quoted_path = quote_with_safe(&path, PATH_SAFE);
    if !scheme.starts_with("feed") {
        quoted_path = fix_wayback(&quoted_path);
    }
    let quoted_fragment = quote_with_safe(&fragment_decoded, FRAGMENT_SAFE);

    let parts = UrlParts {
        scheme,
        userinfo,
        host,
        port,
        path: quoted_path,
        query,
        fragment: quoted_fragment,
    };

    let mut url = parts.to_url_string();
    if raw.ends_with('#') && parts.fragment.is_empty() {
        url.push('#');
    }

    Ok(Normalized {
        url,
        parts,
        is_idn,
        had_whitespace,
    })
}

fn parse_relative(rest: &str) -> UrlParts {
    let (path_and_query, fragment) = match rest.split_once('#') {
        Some((p, f)) => (p, f),
        None => (rest, ""),
    };
    let (path, query) = match path_and_query.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (path_and_query.to_string(), String::new()),
    };
    let path = collapse_segments(&decode(&path));
    UrlParts {
        scheme: String::new(),
        userinfo: None,
        host: None,
        port: None,
        path: quote_with_safe(&path, PATH_SAFE),
        query: normalize_query(&query),
        fragment: quote_with_safe(&decode(fragment), FRAGMENT_SAFE),
    }
}

fn split_host_port(hostport: &str) -> (String, Option<u16>) {
    match hostport.rsplit_once(':') {
        Some((h, p)) => match p.parse::<u16>() {
            Ok(port) => (h.to_string(), Some(port)),
            Err(_) if p.is_empty() => (h.to_string(), None),
            Err(_) => (hostport.to_string(), None),
        },
        None => (hostport.to_string(), None),
    }
}

/// `url.py:idna_encode`.
fn idna_encode(host: &str) -> (String, bool) {
    if host.is_empty() {
        return (host.to_string(), false);
    }
    if host.is_ascii() {
        return (host.to_string(), false);
    }
    match idna::domain_to_ascii(host) {
        Ok(ascii) => {
            let changed = ascii != host;
            (ascii, changed)
        }
        Err(_) => (host.to_string(), false),
    }
}

pub(crate) fn is_absolute(s: &str) -> bool {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-.a-zA-Z]+:").unwrap());
    RE.is_match(s)
}

/// Join a relative reference against an absolute base, RFC 3986 style,
/// with the `mailto:`/Windows `file:` caveats from §4.1 rule 2.
fn join_relative(base: &str, rel: &str) -> Res<String> {
    if rel.is_empty() {
        return Ok(base.to_string());
    }
    if is_absolute(rel) {
        return Ok(rel.to_string());
    }
    let base_url = url::Url::parse(base).context("Failed to parse base URL for join")?;
    let joined = base_url
        .join(rel)
        .with_context(|| format!("Failed to join relative URL '{}' against base", rel))?;
    Ok(joined.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotent_normalisation() {
        let first = normalize("HTTP://Example.COM:80/a/../b/./c?x=1&y=", None, None).unwrap();
        let second = normalize(&first.url, None, None).unwrap();
        assert_eq!(first.url, second.url);
    }

    #[test]
    fn fingerprint_ignores_fragment() {
        let a = normalize("http://example.com/page", None, None).unwrap();
        let b = normalize("http://example.com/page#section", None, None).unwrap();
        assert_eq!(a.cache_url(), b.cache_url());
    }

    #[test]
    fn default_port_is_dropped() {
        let n = normalize("http://example.com:80/x", None, None).unwrap();
        assert!(!n.url.contains(":80"));
    }

    #[test]
    fn non_default_port_is_kept() {
        let n = normalize("http://example.com:8080/x", None, None).unwrap();
        assert!(n.url.contains(":8080"));
    }

    #[test]
    fn collapses_dot_segments() {
        assert_eq!(collapse_segments("/a/./b/../c"), "/a/c");
        assert_eq!(collapse_segments("a/b/../c"), "a/c");
        assert_eq!(collapse_segments("/../a"), "/a");
    }

    #[test]
    fn collapses_backslashes() {
        assert_eq!(collapse_segments("/a\\b\\c"), "/a/b/c");
    }

    #[test]
    fn mailto_splits_query() {
        let n = normalize("mailto:user@example.com?subject=hi", None, None).unwrap();
        assert_eq!(n.parts.scheme, "mailto");
        assert!(n.parts.path.contains("user"));
        assert!(n.parts.query.contains("subject"));
    }

    proptest::proptest! {
        /// §8 item 1: normalising an already-normalised URL is a no-op.
        #[test]
        fn prop_normalisation_is_idempotent(
            host in "[a-z]{3,10}\\.(com|org|net)",
            segs in proptest::collection::vec("[a-z0-9]{1,8}", 0..4),
            query_key in "[a-z]{1,6}",
            query_val in "[a-z0-9]{0,6}",
        ) {
            let path = segs.iter().map(|s| format!("/{s}")).collect::<String>();
            let raw = format!("HTTP://{host}:80{path}?{query_key}={query_val}");
            let first = normalize(&raw, None, None).unwrap();
            let second = normalize(&first.url, None, None).unwrap();
            proptest::prop_assert_eq!(first.url, second.url);
        }

        /// §8 item 2: two URLs differing only by fragment share a cache key.
        #[test]
        fn prop_fingerprint_ignores_fragment(
            host in "[a-z]{3,10}\\.(com|org|net)",
            path in "[a-z0-9/]{0,12}",
            fragment in "[a-z0-9]{1,8}",
        ) {
            let base = format!("http://{host}/{path}");
            let with_fragment = format!("{base}#{fragment}");
            let a = normalize(&base, None, None).unwrap();
            let b = normalize(&with_fragment, None, None).unwrap();
            proptest::prop_assert_eq!(a.cache_url(), b.cache_url());
        }
    }
}
