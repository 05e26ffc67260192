//! The URL object state machine (C7, `spec.md` §3/§4.7): per-link
//! lifecycle `new -> built -> checking -> fetched -> parsed -> done`
//! (or one of the short-circuit terminals `ignored`/`cached`/`failed`).
//! Ported from `examples/original_source/linkcheck/checker/__init__.py`
//! (`get_url_from`, `get_urlclass_from`) and `url.py`/`httpurl.py` for the
//! result field names (`aliases`, `ssl_cert`, `dltime`).
//!
//! A `UrlObject` is owned by exactly one worker between dequeue and the
//! enqueue of its children (§3 "never shared mutably"); it stores its
//! parent's fingerprint string rather than a pointer, so no back-edges
//! are needed once a worker hands a finished object to the logger
//! (§9 Design Note "Cyclic references").

use std::time::Instant;

use crate::aggregate::Aggregate;
use crate::cache::result::{CachedResult, ClaimOutcome};
use crate::checkers::{self, SchemeClass};
use crate::extract::{self, ContentKind, FoundLink};
use crate::url_norm::{self, UrlParts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UrlState {
    New,
    Built,
    Checking,
    Fetched,
    Parsed,
    Done,
    Ignored,
    Cached,
    Failed,
}

/// The raw, not-yet-normalised fields a worker needs to build a
/// `UrlObject` (§3 `URLObject`'s `base_url`/`parent_url`/`base_ref`/
/// `name`/`line`/`column`/`page`/`recursion_level`).
pub(crate) struct PendingLink {
    pub(crate) base_url: String,
    pub(crate) parent_url: Option<String>,
    pub(crate) base_ref: Option<String>,
    pub(crate) name: String,
    pub(crate) line: Option<u32>,
    pub(crate) column: Option<u32>,
    pub(crate) page: u32,
    pub(crate) recursion_level: i32,
}

impl PendingLink {
    pub(crate) fn seed(url: String) -> Self {
        PendingLink {
            base_url: url,
            parent_url: None,
            base_ref: None,
            name: String::new(),
            line: None,
            column: None,
            page: 0,
            recursion_level: 0,
        }
    }

    pub(crate) fn child(found: FoundLink, parent_url: &str, recursion_level: i32) -> Self {
        PendingLink {
            base_url: found.url,
            parent_url: Some(parent_url.to_string()),
            base_ref: if found.base.is_empty() { None } else { Some(found.base) },
            name: found.name,
            line: found.line,
            column: found.column,
            page: found.page,
            recursion_level,
        }
    }
}

pub(crate) struct UrlObject {
    pub(crate) base_url: String,
    pub(crate) parent_url: Option<String>,
    pub(crate) base_ref: Option<String>,
    pub(crate) name: String,
    pub(crate) line: Option<u32>,
    pub(crate) column: Option<u32>,
    pub(crate) page: u32,
    pub(crate) recursion_level: i32,

    pub(crate) url: String,
    pub(crate) parts: UrlParts,
    pub(crate) scheme: String,
    pub(crate) anchor: String,
    pub(crate) cache_url: String,
    pub(crate) is_extern: bool,

    pub(crate) valid: bool,
    pub(crate) result: String,
    pub(crate) info: Vec<String>,
    pub(crate) warnings: Vec<(String, String)>,
    pub(crate) content_type: Option<String>,
    pub(crate) content_encoding: Option<String>,
    pub(crate) size: i64,
    pub(crate) dltime: f64,
    pub(crate) aliases: Vec<String>,
    pub(crate) ssl_cert: Option<String>,

    pub(crate) state: UrlState,
}

impl UrlObject {
    fn blank(pending: PendingLink) -> Self {
        UrlObject {
            base_url: pending.base_url,
            parent_url: pending.parent_url,
            base_ref: pending.base_ref,
            name: pending.name,
            line: pending.line,
            column: pending.column,
            page: pending.page,
            recursion_level: pending.recursion_level,
            url: String::new(),
            parts: UrlParts {
                scheme: String::new(),
                userinfo: None,
                host: None,
                port: None,
                path: String::new(),
                query: String::new(),
                fragment: String::new(),
            },
            scheme: String::new(),
            anchor: String::new(),
            cache_url: String::new(),
            is_extern: false,
            valid: false,
            result: String::new(),
            info: Vec::new(),
            warnings: Vec::new(),
            content_type: None,
            content_encoding: None,
            size: -1,
            dltime: 0.0,
            aliases: Vec::new(),
            ssl_cert: None,
            state: UrlState::New,
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.result = message.into();
        self.state = UrlState::Failed;
    }

    /// `new -> built` (§4.7 step 1): normalise, classify.
    fn build(&mut self, agg: &Aggregate) {
        let assume_local_file = self.recursion_level == 0;

        let normalized = match url_norm::normalize(
            &self.base_url,
            self.parent_url.as_deref(),
            self.base_ref.as_deref(),
        ) {
            Ok(n) => n,
            Err(e) => {
                self.fail(format!("URL is unrecognized or has invalid syntax: {e}"));
                return;
            }
        };

        if normalized.had_whitespace {
            self.warnings.push((
                "whitespace".to_string(),
                "Leading or trailing whitespace in URL.".to_string(),
            ));
        }

        self.url = normalized.url.clone();
        self.cache_url = normalized.cache_url();
        self.anchor = normalized.parts.fragment.clone();
        self.scheme = normalized.parts.scheme.clone();
        self.parts = normalized.parts;

        if self.scheme.is_empty() && assume_local_file {
            let path = std::env::current_dir()
                .map(|d| d.join(&self.base_url))
                .unwrap_or_else(|_| std::path::PathBuf::from(&self.base_url));
            self.url = format!("file://{}", path.to_string_lossy());
            if let Ok(n) = url_norm::normalize(&self.url, None, None) {
                self.cache_url = n.cache_url();
                self.anchor = n.parts.fragment.clone();
                self.scheme = n.parts.scheme.clone();
                self.parts = n.parts;
                self.url = n.url;
            }
        }

        self.is_extern = agg.is_extern(&self.url);
        self.state = UrlState::Built;
    }

    fn classify(&self, agg: &Aggregate) -> SchemeClass {
        let assume_local_file = self.recursion_level == 0 && self.base_url.find(':').is_none_or(|i| {
            self.base_url[..i].chars().any(|c| !c.is_ascii_alphanumeric() && c != '+' && c != '-' && c != '.')
        });
        let class = checkers::classify(&self.scheme, assume_local_file || self.scheme.is_empty());
        let _ = agg;
        class
    }

    /// Whether this `UrlObject` should be dropped before any connection
    /// is attempted (§4.7 step 2): a forbidden/ignored scheme, or a
    /// configured ignore-error regex matching the URL.
    fn should_ignore(&self, agg: &Aggregate, class: SchemeClass) -> Option<&'static str> {
        if class == SchemeClass::Unknown && checkers::is_ignored_scheme(&self.scheme) {
            return Some("ignored scheme");
        }
        if !agg.config.allowed_schemes.is_empty()
            && !agg.config.allowed_schemes.iter().any(|s| s == &self.scheme)
        {
            return Some("scheme not in allowed_schemes");
        }
        None
    }

    fn is_parseable(&self) -> bool {
        self.valid
            && self
                .content_type
                .as_deref()
                .and_then(ContentKind::from_mime)
                .is_some()
    }

    fn content_kind(&self) -> Option<ContentKind> {
        self.content_type.as_deref().and_then(ContentKind::from_mime)
    }

    /// Drive the whole lifecycle for one dequeued `PendingLink` and
    /// return the finished `UrlObject` plus any children to enqueue
    /// (§4.7 steps 1-7; the worker owns enqueueing, logging, and
    /// recursion-depth/no-follow gating around this call).
    pub(crate) async fn process(pending: PendingLink, agg: &Aggregate, body_out: &mut Option<Vec<u8>>) -> (UrlObject, Vec<PendingLink>) {
        let mut obj = UrlObject::blank(pending);
        obj.build(agg);

        if obj.state == UrlState::Failed {
            return (obj, Vec::new());
        }

        let class = obj.classify(agg);
        if let Some(_reason) = obj.should_ignore(agg, class) {
            obj.valid = true;
            obj.state = UrlState::Ignored;
            obj.info.push(format!("Ignoring unsupported scheme `{}'.", obj.scheme));
            return (obj, Vec::new());
        }

        if agg.is_ignored_error(&obj.url) {
            obj.valid = true;
            obj.state = UrlState::Ignored;
            obj.info.push("Only syntax checked.".to_string());
            return (obj, Vec::new());
        }

        match agg.result_cache.claim(&obj.cache_url).await {
            ClaimOutcome::Cached(cached) => {
                obj.apply_cached(cached);
                obj.warnings.retain(|(tag, _)| !agg.is_ignored_warning(tag));
                obj.state = UrlState::Cached;
                return (obj, Vec::new());
            }
            ClaimOutcome::WaitOn(notify) => {
                notify.notified().await;
                if let ClaimOutcome::Cached(cached) = agg.result_cache.claim(&obj.cache_url).await {
                    obj.apply_cached(cached);
                } else {
                    obj.fail("cache wait produced no result");
                }
                obj.warnings.retain(|(tag, _)| !agg.is_ignored_warning(tag));
                obj.state = UrlState::Cached;
                return (obj, Vec::new());
            }
            ClaimOutcome::Owner => {}
        }

        obj.state = UrlState::Checking;
        let start = Instant::now();
        let output = checkers::dispatch(agg, class, &obj.parts, &obj.url, obj.parent_url.as_deref()).await;
        obj.dltime = start.elapsed().as_secs_f64();
        agg.record_checked();

        obj.aliases = output.aliases;
        obj.content_type = output.content_type;
        obj.content_encoding = output.content_encoding;
        obj.ssl_cert = output.ssl_cert;
        if output.size >= 0 {
            obj.size = output.size;
        }

        match output.outcome {
            crate::checkers::CheckOutcome::Ok { info, warnings } => {
                obj.valid = true;
                obj.info.extend(info);
                obj.warnings.extend(warnings.into_iter().map(|(t, m)| (t.to_string(), m)));
            }
            crate::checkers::CheckOutcome::Failed { result, info, warnings } => {
                obj.valid = false;
                obj.result = result;
                obj.info.extend(info);
                obj.warnings.extend(warnings.into_iter().map(|(t, m)| (t.to_string(), m)));
            }
        }
        obj.state = UrlState::Fetched;

        agg.result_cache
            .finish(&obj.cache_url, obj.to_cached_result())
            .await;

        let mut children = Vec::new();
        for extra in output.extra_links {
            children.push(PendingLink::child(
                FoundLink { url: extra, line: None, column: None, name: String::new(), base: obj.url.clone(), page: 0 },
                &obj.url,
                obj.recursion_level + 1,
            ));
        }

        let body = output.body;
        // §4.5/§6: an extern link is still checked, but its own outgoing
        // links aren't recursed into unless `check_extern` opts back in.
        let depth_ok = (agg.config.recursion_level < 0 || obj.recursion_level < agg.config.recursion_level)
            && (!obj.is_extern || agg.config.check_extern);

        if obj.valid && !output.skip_content && depth_ok {
            if let (Some(kind), Some(full_bytes)) = (obj.content_kind(), body.as_ref()) {
                obj.state = UrlState::Parsed;
                let parse_cap = agg.config.max_file_size_parse as usize;
                let bytes = if full_bytes.len() > parse_cap { &full_bytes[..parse_cap] } else { full_bytes.as_slice() };
                let text = String::from_utf8_lossy(bytes).into_owned();

                if kind == ContentKind::Html {
                    if let Some(found_base) = extract::html::find_base_ref(&text) {
                        obj.base_ref = Some(found_base);
                    }
                    if agg.plugins.anchor_check {
                        if let Some(warning) = crate::plugins::anchorcheck::check(
                            agg,
                            &obj.cache_url,
                            &obj.anchor,
                            &text,
                        )
                        .await
                        {
                            obj.warnings.push(("anchor_not_found".to_string(), warning));
                        }
                    }
                }

                let nofollow = kind == ContentKind::Html && extract::html::has_robots_nofollow(&text);
                if nofollow {
                    obj.warnings.push((
                        "nofollow".to_string(),
                        "Robots meta nofollow directive found.".to_string(),
                    ));
                } else if !agg.is_no_follow(&obj.url) {
                    let found = extract::extract(kind, bytes, &obj.url, obj.page);
                    for link in found {
                        children.push(PendingLink::child(link, &obj.url, obj.recursion_level + 1));
                    }
                }
                obj.state = UrlState::Done;
            } else {
                obj.state = UrlState::Done;
            }
        } else {
            obj.state = if obj.valid { UrlState::Done } else { UrlState::Failed };
        }

        obj.warnings.retain(|(tag, _)| !agg.is_ignored_warning(tag));
        *body_out = body;
        (obj, children)
    }

    fn apply_cached(&mut self, cached: CachedResult) {
        self.valid = cached.valid;
        self.result = cached.result;
        self.info = cached.info;
        self.warnings = cached.warnings;
        self.content_type = cached.content_type;
    }

    fn to_cached_result(&self) -> CachedResult {
        CachedResult {
            valid: self.valid,
            result: self.result.clone(),
            info: self.info.clone(),
            warnings: self.warnings.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn agg() -> Aggregate {
        Aggregate::new(Config::default()).expect("builds with default config")
    }

    #[tokio::test]
    async fn ignored_scheme_short_circuits_without_network() {
        let agg = agg();
        let pending = PendingLink::seed("javascript:alert(1)".to_string());
        let mut body = None;
        let (obj, children) = UrlObject::process(pending, &agg, &mut body).await;
        assert_eq!(obj.state, UrlState::Ignored);
        assert!(obj.valid);
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn malformed_mailto_is_failed_not_panicking() {
        let agg = agg();
        let pending = PendingLink::seed("mailto:".to_string());
        let mut body = None;
        let (obj, _) = UrlObject::process(pending, &agg, &mut body).await;
        assert!(!obj.valid);
        assert_eq!(obj.state, UrlState::Failed);
    }
}
