//! HTML link extraction (`spec.md` §4.2), ported from
//! `examples/original_source/linkcheck/htmlutil/linkparse.py`'s
//! `LinkTags`/`AnchorTags` tables and `LinkFinder`.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::{css::css_urls_in, srcset::parse_srcset, FoundLink};

/// `linkparse.py:LinkTags`, the literal tag/attribute table (not the
/// abbreviated list `spec.md` §4.2 calls out by example).
static LINK_TAGS: LazyLock<HashMap<&'static str, &'static [&'static str]>> = LazyLock::new(|| {
    HashMap::from([
        ("a", &["href"][..]),
        ("applet", &["archive", "src"][..]),
        ("area", &["href"][..]),
        ("audio", &["src"][..]),
        ("bgsound", &["src"][..]),
        ("blockquote", &["cite"][..]),
        ("body", &["background"][..]),
        ("button", &["formaction"][..]),
        ("del", &["cite"][..]),
        ("embed", &["pluginspage", "src"][..]),
        ("form", &["action"][..]),
        ("frame", &["src", "longdesc"][..]),
        ("head", &["profile"][..]),
        ("html", &["manifest"][..]),
        ("iframe", &["src", "longdesc"][..]),
        ("ilayer", &["background"][..]),
        ("img", &["src", "lowsrc", "longdesc", "usemap", "srcset"][..]),
        ("input", &["src", "usemap", "formaction"][..]),
        ("ins", &["cite"][..]),
        ("isindex", &["action"][..]),
        ("layer", &["background", "src"][..]),
        ("link", &["href"][..]),
        ("meta", &["content", "href"][..]),
        ("object", &["classid", "data", "archive", "usemap", "codebase"][..]),
        ("q", &["cite"][..]),
        ("script", &["src"][..]),
        ("source", &["src"][..]),
        ("table", &["background"][..]),
        ("td", &["background"][..]),
        ("th", &["background"][..]),
        ("tr", &["background"][..]),
        ("track", &["src"][..]),
        ("video", &["src"][..]),
        ("xmp", &["href"][..]),
    ])
});

/// Universal attributes checked on every element regardless of tag
/// (`linkparse.py:LinkTags[None]`).
const UNIVERSAL_ATTRS: &[&str] = &["style", "itemtype"];

static REFRESH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+;\s*url=(?P<url>.+)$").unwrap());

fn is_meta_url(attr: &str, attrs: &HashMap<String, String>) -> bool {
    if attr == "content" {
        let equiv = attrs.get("http-equiv").map(|s| s.to_lowercase()).unwrap_or_default();
        let scheme = attrs.get("scheme").map(|s| s.to_lowercase()).unwrap_or_default();
        return equiv == "refresh" || scheme == "dcterms.uri";
    }
    if attr == "href" {
        let rel = attrs.get("rel").map(|s| s.to_lowercase()).unwrap_or_default();
        return rel == "shortcut icon" || rel == "icon";
    }
    false
}

fn is_form_get(attr: &str, attrs: &HashMap<String, String>) -> bool {
    if attr == "action" {
        let method = attrs.get("method").map(|s| s.to_lowercase()).unwrap_or_default();
        return method != "post";
    }
    false
}

fn link_name(tag: &str, attr: &str, attrs: &HashMap<String, String>) -> String {
    if tag == "a" && attr == "href" {
        attrs.get("title").cloned().unwrap_or_default()
    } else if tag == "img" {
        attrs
            .get("alt")
            .cloned()
            .filter(|s| !s.is_empty())
            .or_else(|| attrs.get("title").cloned())
            .unwrap_or_default()
    } else {
        String::new()
    }
}

/// `linkparse.py:LinkFinder.parse_tag` + `.html_element`.
pub(crate) fn extract_html(text: &str, base_url: &str, page: u32) -> Vec<FoundLink> {
    let doc = Html::parse_document(text);
    let mut out = Vec::new();
    let mut base_ref = String::new();

    let all: Selector = Selector::parse("*").unwrap();
    for element in doc.select(&all) {
        let el = element.value();
        let tag = el.name();
        let attrs: HashMap<String, String> = el
            .attrs()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect();

        if tag == "base" && base_ref.is_empty() {
            if let Some(href) = attrs.get("href") {
                base_ref = href.clone();
            }
        }

        let tag_attrs: &[&str] = LINK_TAGS.get(tag).copied().unwrap_or(&[]);
        let mut candidates: Vec<&str> = tag_attrs
            .iter()
            .chain(UNIVERSAL_ATTRS.iter())
            .filter(|a| attrs.contains_key(**a))
            .copied()
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        for attr in candidates {
            if tag == "meta" && !is_meta_url(attr, &attrs) {
                continue;
            }
            if tag == "form" && !is_form_get(attr, &attrs) {
                continue;
            }

            let name = link_name(tag, attr, &attrs);
            let base = if tag == "applet" {
                attrs.get("codebase").cloned().unwrap_or_else(|| base_ref.clone())
            } else if !base_ref.is_empty() {
                base_ref.clone()
            } else {
                String::new()
            };

            let mut value = attrs.get(attr).cloned();

            // dns-prefetch / preconnect rewrite (§11 supplement)
            if tag == "link" {
                let rel = attrs.get("rel").map(|s| s.to_lowercase()).unwrap_or_default();
                if (rel.contains("dns-prefetch") || rel.contains("preconnect")) && value.is_some() {
                    let mut v = value.unwrap();
                    if let Some(idx) = v.find(':') {
                        v = v[idx + 1..].to_string();
                    }
                    value = Some(format!("dns:{}", v.trim_end_matches('/')));
                }
            }

            push_tag(&mut out, tag, attr, value, &name, &base, page);
        }
    }

    out
}

fn push_tag(
    out: &mut Vec<FoundLink>,
    tag: &str,
    attr: &str,
    value: Option<String>,
    name: &str,
    base: &str,
    page: u32,
) {
    let push = |out: &mut Vec<FoundLink>, url: String| {
        out.push(FoundLink {
            url,
            line: None,
            column: None,
            name: name.to_string(),
            base: base.to_string(),
            page,
        });
    };

    match (tag, value) {
        ("meta", Some(v)) if !v.is_empty() => {
            if let Some(caps) = REFRESH_RE.captures(&v) {
                push(out, caps["url"].to_string());
            } else if attr != "content" {
                push(out, v);
            }
        }
        (_, Some(v)) if attr == "style" && !v.is_empty() => {
            for url in css_urls_in(&v) {
                push(out, url);
            }
        }
        (_, Some(v)) if attr == "archive" => {
            for part in v.split(',') {
                push(out, part.trim().to_string());
            }
        }
        (_, Some(v)) if attr == "srcset" => {
            for url in parse_srcset(&v) {
                push(out, url);
            }
        }
        (_, Some(v)) => push(out, v),
        (_, None) => {}
    }
}

/// `linkparse.py:AnchorTags` (`{'a': ['name'], None: ['id']}`): the set
/// of anchor names defined on the page, for `AnchorCheck`
/// (`spec.md` §4.4/§9 Design Note (c)).
pub(crate) fn extract_anchors(text: &str) -> HashSet<String> {
    let doc = Html::parse_document(text);
    let mut out = HashSet::new();

    let all: Selector = Selector::parse("*").unwrap();
    for element in doc.select(&all) {
        let el = element.value();
        if el.name() == "a" {
            if let Some(name) = el.attr("name") {
                out.insert(name.to_string());
            }
        }
        if let Some(id) = el.attr("id") {
            out.insert(id.to_string());
        }
    }
    out
}

/// Robots meta nofollow directive: `<meta name="robots" content="…">`
/// whose content contains the word `nofollow` (§4.3, case-insensitive,
/// bounded by non-word characters).
pub(crate) fn has_robots_nofollow(text: &str) -> bool {
    static NOFOLLOW_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\bnofollow\b").unwrap());

    let doc = Html::parse_document(text);
    let selector = Selector::parse(r#"meta[name="robots" i]"#).unwrap();
    doc.select(&selector).any(|el| {
        el.value()
            .attr("content")
            .is_some_and(|c| NOFOLLOW_RE.is_match(c))
    })
}

/// First `<base href>` found on the page, if any.
pub(crate) fn find_base_ref(text: &str) -> Option<String> {
    let doc = Html::parse_document(text);
    let selector = Selector::parse("base[href]").unwrap();
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_and_img_links() {
        let html = r#"<html><body>
            <a href="/page">link</a>
            <img src="/pic.png" alt="alt text">
        </body></html>"#;
        let links = extract_html(html, "", 0);
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert!(urls.contains(&"/page"));
        assert!(urls.contains(&"/pic.png"));
    }

    #[test]
    fn meta_refresh_only() {
        let html = r#"<meta http-equiv="refresh" content="5; url=/next">"#;
        let links = extract_html(html, "", 0);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "/next");
    }

    #[test]
    fn meta_without_refresh_or_icon_is_skipped() {
        let html = r#"<meta name="description" content="hello">"#;
        let links = extract_html(html, "", 0);
        assert!(links.is_empty());
    }

    #[test]
    fn form_post_is_skipped_get_is_kept() {
        let html = r#"<form method="post" action="/submit-post"></form>
                       <form method="get" action="/submit-get"></form>"#;
        let links = extract_html(html, "", 0);
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert!(!urls.contains(&"/submit-post"));
        assert!(urls.contains(&"/submit-get"));
    }

    #[test]
    fn dns_prefetch_is_rewritten() {
        let html = r#"<link rel="dns-prefetch" href="//fonts.example.com/">"#;
        let links = extract_html(html, "", 0);
        assert_eq!(links[0].url, "dns://fonts.example.com");
    }

    #[test]
    fn inline_style_url_extracted() {
        let html = r#"<div style="background: url('/bg.png')"></div>"#;
        let links = extract_html(html, "", 0);
        assert_eq!(links[0].url, "/bg.png");
    }

    #[test]
    fn anchors_from_name_and_id() {
        let html = r#"<a name="top"></a><div id="myid">x</div>"#;
        let anchors = extract_anchors(html);
        assert!(anchors.contains("top"));
        assert!(anchors.contains("myid"));
    }

    #[test]
    fn robots_nofollow_detected_case_insensitively() {
        let html = r#"<meta name="robots" content="NoIndex, NOFOLLOW">"#;
        assert!(has_robots_nofollow(html));
        let clean = r#"<meta name="robots" content="index, follow">"#;
        assert!(!has_robots_nofollow(clean));
    }

    #[test]
    fn base_ref_is_found() {
        let html = r#"<base href="https://example.com/sub/"><a href="x">x</a>"#;
        assert_eq!(find_base_ref(html).as_deref(), Some("https://example.com/sub/"));
    }
}
