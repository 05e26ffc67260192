//! Plain-text URL list extraction (`spec.md` §4.2): one URL per
//! non-blank, non-`#` line.

use super::FoundLink;

pub(crate) fn extract_textlist(text: &str, base_url: &str, page: u32) -> Vec<FoundLink> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| FoundLink {
            url: line.to_string(),
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
    fn skips_blank_and_comment_lines() {
        let text = "http://a.example\n\n# a comment\nhttp://b.example\n  \n";
        let links = extract_textlist(text, "", 0);
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a.example", "http://b.example"]);
    }
}
