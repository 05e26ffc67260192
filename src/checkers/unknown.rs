//! Fallback checker for `SchemeClass::Unknown` (`checker/unknownurl.py`):
//! IANA-ignored schemes are reported "ignored" and never fail the run;
//! anything else is invalid syntax.

use crate::aggregate::Aggregate;
use crate::url_norm::UrlParts;

use super::{is_ignored_scheme, CheckOutcome, FetchOutput};

pub(crate) async fn check(_agg: &Aggregate, parts: &UrlParts, _url: &str) -> FetchOutput {
    let outcome = if is_ignored_scheme(&parts.scheme) {
        CheckOutcome::ok().with_info(format!("Ignoring unsupported scheme `{}'.", parts.scheme))
    } else {
        CheckOutcome::failed(format!("Unrecognized scheme `{}'.", parts.scheme))
    };

    FetchOutput {
        outcome,
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

    fn parts(scheme: &str) -> UrlParts {
        UrlParts {
            scheme: scheme.to_string(),
            userinfo: None,
            host: None,
            port: None,
            path: String::new(),
            query: String::new(),
            fragment: String::new(),
        }
    }

    #[test]
    fn classification_matches_ignored_set() {
        assert!(is_ignored_scheme("javascript"));
        assert!(!is_ignored_scheme("http"));
        let _ = parts("x");
    }
}
