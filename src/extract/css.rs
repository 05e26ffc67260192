//! CSS link extraction (`spec.md` §4.2), ported from
//! `examples/original_source/linkcheck/htmlutil/linkparse.py`
//! (`css_url_re`, `strip_c_comments`).

use std::sync::LazyLock;

use regex::Regex;

use super::FoundLink;

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static CSS_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\(\s*('[^']+'|"[^"]+"|[^)\s]+)\s*\)"#).unwrap());

fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && ((bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'')
        || (bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"'))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Every `url(...)` occurrence in `text`, quotes stripped. Shared between
/// a standalone stylesheet and an inline `style="..."` attribute value.
pub(crate) fn css_urls_in(text: &str) -> Vec<String> {
    CSS_URL_RE
        .captures_iter(text)
        .map(|c| unquote(c.get(1).unwrap().as_str()).to_string())
        .collect()
}

pub(crate) fn extract_css(text: &str, base_url: &str, page: u32) -> Vec<FoundLink> {
    let stripped = COMMENT_RE.replace_all(text, "");
    css_urls_in(&stripped)
        .into_iter()
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
    fn finds_quoted_and_bare_urls() {
        let css = "a { background: url('/a.png'); } b { background: url(/b.png); }";
        let links = extract_css(css, "", 0);
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["/a.png", "/b.png"]);
    }

    #[test]
    fn comments_are_stripped_first() {
        let css = "/* url(/hidden.png) */ .x { background: url(/visible.png); }";
        let links = extract_css(css, "", 0);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "/visible.png");
    }
}
