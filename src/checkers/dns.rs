//! `dns:` checker for `dns-prefetch`/`preconnect` hints (§11 supplement,
//! ported from the rewrite the HTML extractor performs on those `<link>`
//! tags). Resolution only, no further recursion: a DNS URL's "content" is
//! never parsed for links.

use tokio::net::lookup_host;

use crate::aggregate::Aggregate;
use crate::url_norm::UrlParts;

use super::{CheckOutcome, FetchOutput};

pub(crate) async fn check(_agg: &Aggregate, parts: &UrlParts, _url: &str) -> FetchOutput {
    let host = parts.host.clone().unwrap_or_else(|| parts.path.trim_start_matches('/').to_string());
    if host.is_empty() {
        return FetchOutput::failed("no hostname given");
    }

    match lookup_host((host.as_str(), 0)).await {
        Ok(mut addrs) => {
            let first = addrs.next();
            FetchOutput {
                outcome: CheckOutcome::ok().with_info(match first {
                    Some(addr) => format!("Resolved `{host}' to {}.", addr.ip()),
                    None => format!("Resolved `{host}' to no addresses."),
                }),
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
        Err(e) => FetchOutput::failed(format!("DNS resolution failed for `{host}': {e}")),
    }
}
