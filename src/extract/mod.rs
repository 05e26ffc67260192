//! Link extractor (C2, `spec.md` §4.2): from parsed content of a given
//! MIME type, emit `(url, line, column, name, base)` tuples.

pub(crate) mod css;
pub(crate) mod html;
pub(crate) mod sitemap;
pub(crate) mod srcset;
pub(crate) mod swf;
pub(crate) mod textlist;

/// One discovered link (`spec.md` §2 C2, §4.2 "each emitted link carries
/// line/column/name/base and the current page number").
#[derive(Debug, Clone)]
pub(crate) struct FoundLink {
    pub(crate) url: String,
    pub(crate) line: Option<u32>,
    pub(crate) column: Option<u32>,
    pub(crate) name: String,
    pub(crate) base: String,
    pub(crate) page: u32,
}

/// The content types this crate knows how to extract links from
/// (`spec.md` glossary "Parseable").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContentKind {
    Html,
    Css,
    XmlSitemap,
    PlainTextUrlList,
    Swf,
}

impl ContentKind {
    /// Map a `Content-Type` header / sniffed type string to a content
    /// kind, if this crate knows how to parse it for links.
    pub(crate) fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.split(';').next().unwrap_or(mime).trim().to_lowercase();
        match mime.as_str() {
            "text/html" | "application/xhtml+xml" => Some(Self::Html),
            "text/css" => Some(Self::Css),
            "application/xml" | "text/xml" => Some(Self::XmlSitemap),
            "text/plain" => Some(Self::PlainTextUrlList),
            "application/x-shockwave-flash" => Some(Self::Swf),
            _ => None,
        }
    }
}

/// Dispatch to the right parser and collect every `FoundLink` in the
/// payload (`spec.md` §4.2).
pub(crate) fn extract(kind: ContentKind, body: &[u8], base_url: &str, page: u32) -> Vec<FoundLink> {
    match kind {
        ContentKind::Html => {
            let text = String::from_utf8_lossy(body);
            html::extract_html(&text, base_url, page)
        }
        ContentKind::Css => {
            let text = String::from_utf8_lossy(body);
            css::extract_css(&text, base_url, page)
        }
        ContentKind::XmlSitemap => {
            let text = String::from_utf8_lossy(body);
            sitemap::extract_sitemap(&text, base_url, page)
        }
        ContentKind::PlainTextUrlList => {
            let text = String::from_utf8_lossy(body);
            textlist::extract_textlist(&text, base_url, page)
        }
        ContentKind::Swf => swf::extract_swf(body, base_url, page),
    }
}
