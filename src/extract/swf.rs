//! Flash (SWF) byte-level URL scan (`spec.md` §4.2), ported from
//! `examples/original_source/linkcheck/url.py`'s `safe_url_pattern` used
//! (byte-encoded) as `linkparse.py:swf_url_re`. Binary bodies are scraped
//! for anything that looks like an `http(s)`/`ftp` URL rather than
//! properly decoded as SWF tags.

use std::sync::LazyLock;

use regex::bytes::Regex;

use super::FoundLink;

static SWF_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(https?|ftp)://([a-z0-9][-a-z0-9]{0,61}|[a-z])(\.([a-z0-9][-a-z0-9]{0,61}|[a-z]))*\.?(:(80|8080|8000|443))?((/([a-z0-9\-_.!~*'(),]|%[2-9a-f][0-9a-f])+)*/?)(#([a-z0-9\-_.!~*'(),+]|%[2-9a-f][0-9a-f])*)?",
    )
    .unwrap()
});

pub(crate) fn extract_swf(body: &[u8], base_url: &str, page: u32) -> Vec<FoundLink> {
    SWF_URL_RE
        .find_iter(body)
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .map(|url| FoundLink {
            url,
            line: None,
            column: None,
            name: String::new(),
            base: base_url.to_string(),
            page,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_http_url_embedded_in_binary_noise() {
        let mut body = vec![0u8, 1, 2, 3];
        body.extend_from_slice(b"junk http://example.com/a/b.swf more junk");
        body.extend_from_slice(&[4, 5, 6]);
        let links = extract_swf(&body, "", 0);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "http://example.com/a/b.swf");
    }
}
