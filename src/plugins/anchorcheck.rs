//! `AnchorCheck`: does a `#fragment` reference an anchor that actually
//! exists on the page? Ported from the *later* revision of
//! `examples/original_source/linkcheck/plugins/anchorcheck.py` that
//! threads the anchor set through `aggregate.anchor_cache` — the first
//! generation, whose `applies_to` unconditionally returned `False`, is
//! not reproduced (Design Note (a)).

use crate::aggregate::Aggregate;
use crate::extract::html::extract_anchors;
use crate::url_norm::decode;

/// Runs only when content was actually parsed as HTML and the link
/// carries a fragment. Returns a warning message when the anchor is
/// missing, `None` when it's found or there's nothing to check.
pub(crate) async fn check(
    agg: &Aggregate,
    url_without_anchor: &str,
    anchor: &str,
    html: &str,
) -> Option<String> {
    if anchor.is_empty() {
        return None;
    }

    let anchors = match agg.anchor_cache.get_anchors(url_without_anchor).await {
        Some(set) => set,
        None => {
            let set = extract_anchors(html);
            agg.anchor_cache
                .put_anchors(url_without_anchor.to_string(), set.clone())
                .await;
            set
        }
    };

    let decoded_anchor = decode(anchor);
    if anchors.contains(&decoded_anchor) {
        return None;
    }

    let anchor_list = if anchors.is_empty() {
        "-".to_string()
    } else {
        let mut names: Vec<String> = anchors.iter().map(|a| format!("`{a}'")).collect();
        names.sort();
        names.join(", ")
    };

    Some(format!(
        "Anchor `{anchor}' (decoded: `{decoded_anchor}') not found. Available anchors: {anchor_list}."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_aggregate() -> Aggregate {
        Aggregate::new(Config::default()).expect("builds with default config")
    }

    #[tokio::test]
    async fn missing_anchor_lists_available_names() {
        let agg = test_aggregate();
        let html = r#"<a name="top"></a><div id="intro"></div>"#;
        let msg = check(&agg, "http://example.com/page", "missing", html).await;
        let msg = msg.expect("anchor not present");
        assert!(msg.contains("Anchor `missing'"));
        assert!(msg.contains("`intro'"));
        assert!(msg.contains("`top'"));
    }

    #[tokio::test]
    async fn present_anchor_is_silent() {
        let agg = test_aggregate();
        let html = r#"<div id="intro"></div>"#;
        assert!(check(&agg, "http://example.com/page", "intro", html).await.is_none());
    }

    #[tokio::test]
    async fn second_lookup_reuses_cached_anchor_set() {
        let agg = test_aggregate();
        let html = r#"<div id="intro"></div>"#;
        check(&agg, "http://example.com/page", "intro", html).await;
        assert_eq!(agg.anchor_cache.len().await, 1);
        // A second request for the same page must not re-parse or grow the cache.
        check(&agg, "http://example.com/page", "other", "<div></div>").await;
        assert_eq!(agg.anchor_cache.len().await, 1);
    }
}
