//! `mailto:` checker, ported from
//! `examples/original_source/linkcheck/checker/mailtourl.py`: address
//! syntax only, no SMTP `RCPT TO` probing (Non-goal, §9).

use fast_chemail::is_valid_email;

use crate::aggregate::Aggregate;
use crate::url_norm::{decode, UrlParts};

use super::{CheckOutcome, FetchOutput};

pub(crate) async fn check(_agg: &Aggregate, parts: &UrlParts, _url: &str) -> FetchOutput {
    let recipients = decode(&parts.path);
    let addresses: Vec<String> = recipients
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if addresses.is_empty() {
        return FetchOutput::failed("no mail address given");
    }

    let mut warnings = Vec::new();
    for addr in &addresses {
        if !is_valid_email(addr) {
            return FetchOutput::failed(format!("invalid mail address syntax: {addr}"));
        }
        if !addr.contains('@') {
            warnings.push(("no_at", format!("Obfuscated mail address `{addr}'.")));
        }
    }

    FetchOutput {
        outcome: CheckOutcome::Ok {
            info: vec![format!("Valid mail address syntax for {} recipient(s).", addresses.len())],
            warnings,
        },
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
    fn valid_address_passes() {
        assert!(is_valid_email("user@example.com"));
    }
}
