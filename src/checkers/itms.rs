//! `itms-services:` checker: Apple's over-the-air installation scheme
//! (`action=download-manifest&url=...`). Syntax-only — the referenced
//! manifest plist is not itself fetched (Non-goal, §9).

use crate::aggregate::Aggregate;
use crate::url_norm::UrlParts;

use super::{CheckOutcome, FetchOutput};

fn has_required_params(query: &str) -> bool {
    let has_action = query.split('&').any(|kv| kv.starts_with("action="));
    let has_manifest_url = query.split('&').any(|kv| kv.starts_with("url="));
    has_action && has_manifest_url
}

pub(crate) async fn check(_agg: &Aggregate, parts: &UrlParts, _url: &str) -> FetchOutput {
    if !has_required_params(&parts.query) {
        return FetchOutput::failed(
            "itms-services URL missing required 'action' and 'url' query parameters",
        );
    }

    FetchOutput {
        outcome: CheckOutcome::ok().with_info("Valid itms-services install link syntax."),
        body: None,
        content_type: None,
        content_encoding: None,
        size: -1,
        aliases: Vec::new(),
        extra_links: Vec::new(),
        ssl_cert: None,
        skip_content: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_query_params() {
        assert!(!has_required_params("action=download-manifest"));
        assert!(has_required_params(
            "action=download-manifest&url=https://example.com/app.plist"
        ));
    }
}
