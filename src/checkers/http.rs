//! HTTP(S) checker, ported from
//! `examples/original_source/linkcheck/checker/httpurl.py`.

use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use reqwest::StatusCode;

use crate::aggregate::Aggregate;
use crate::url_norm::UrlParts;

use super::{CheckOutcome, FetchOutput};

/// `requests.sessions.REDIRECT_STATI` (Design Note (b)).
const REDIRECT_STATI: &[u16] = &[301, 302, 303, 307, 308];

static REFRESH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+;\s*url=(?P<url>.+)$").unwrap());

fn path_and_query(parts: &UrlParts) -> String {
    let mut s = if parts.path.is_empty() {
        "/".to_string()
    } else {
        parts.path.clone()
    };
    if !parts.query.is_empty() {
        s.push('?');
        s.push_str(&parts.query);
    }
    s
}

/// `check_connection` (§4.7 step 5): robots gate, GET with redirects
/// followed by hand, size cap, status classification.
pub(crate) async fn check(
    agg: &Aggregate,
    parts: &UrlParts,
    url: &str,
    parent_url: Option<&str>,
) -> FetchOutput {
    let host = parts.host.clone().unwrap_or_default();

    if agg.config.robotstxt {
        let allowed = agg
            .robots
            .allows_url(&parts.scheme, &host, parts.port, &path_and_query(parts))
            .await;
        if !allowed {
            return FetchOutput {
                outcome: CheckOutcome::ok()
                    .with_info("Access denied by robots.txt, checked only syntax."),
                body: None,
                content_type: None,
                content_encoding: None,
                size: -1,
                aliases: Vec::new(),
                extra_links: Vec::new(),
                ssl_cert: None,
                skip_content: true,
            };
        }
    }

    let mut current_url = url.to_string();
    let mut aliases = Vec::new();
    let mut redirects = 0u32;
    let mut outcome_warnings: Vec<(&'static str, String)> = Vec::new();

    loop {
        agg.throttle.wait_for_host(&host).await;

        let mut builder = agg.http_client.get(&current_url);
        if let Some(p) = parent_url {
            if p.to_lowercase().starts_with("http") {
                builder = builder.header("Referer", p);
            }
        }
        let (user, password) = agg.config.user_password_for(&current_url);
        if let (Some(u), Some(p)) = (user, password) {
            builder = builder.basic_auth(u, Some(p));
        }

        let resp = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                return FetchOutput::failed(format!("{}", e));
            }
        };

        if resp.headers().contains_key("LinkChecker") {
            agg.throttle.set_maxrated(&host).await;
        }

        let status = resp.status();
        if REDIRECT_STATI.contains(&status.as_u16()) {
            let location = resp
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let Some(location) = location else {
                return finish_non_redirect(resp, outcome_warnings, aliases, agg.config.max_file_size_download).await;
            };
            redirects += 1;
            if redirects > agg.config.max_http_redirects {
                return FetchOutput::failed(format!(
                    "Redirect loop exceeded {} hops",
                    agg.config.max_http_redirects
                ));
            }
            let next_url = match url::Url::parse(&current_url).and_then(|u| u.join(&location)) {
                Ok(u) => u,
                Err(_) => return FetchOutput::failed("Invalid redirect location"),
            };
            if next_url.scheme() != "http" && next_url.scheme() != "https" {
                return FetchOutput::failed(format!(
                    "Redirected to different scheme '{}', refused",
                    next_url.scheme()
                ));
            }
            outcome_warnings.push((
                "redirected",
                format!(
                    "Redirected to `{}' status: {} {}.",
                    next_url,
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ),
            ));
            aliases.push(next_url.to_string());
            current_url = next_url.to_string();
            continue;
        }

        return finish_non_redirect(resp, outcome_warnings, aliases, agg.config.max_file_size_download).await;
    }
}

async fn finish_non_redirect(
    resp: reqwest::Response,
    mut warnings: Vec<(&'static str, String)>,
    aliases: Vec<String>,
    max_file_size_download: u64,
) -> FetchOutput {
    let status = resp.status();
    let headers = resp.headers().clone();
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(';').next().unwrap_or(s).trim().to_string());
    let content_encoding = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split("charset=").nth(1))
        .map(|s| s.trim().to_string());

    let declared_size: i64 = headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(-1);

    let mut extra_links = Vec::new();
    if let Some(refresh) = headers.get("refresh").and_then(|v| v.to_str().ok()) {
        if let Some(caps) = REFRESH_RE.captures(refresh.trim()) {
            extra_links.push(caps["url"].to_string());
        }
    }
    if let Some(loc) = headers.get("content-location").and_then(|v| v.to_str().ok()) {
        extra_links.push(loc.trim().to_string());
    }

    if status == StatusCode::NO_CONTENT {
        warnings.push(("empty_content", "No Content".to_string()));
    }
    if status.as_u16() == 429 {
        let retry_after = headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        warnings.push((
            "rate_limited",
            format!("Rate limited (Retry-After: {})", retry_after),
        ));
    }

    let max_size = max_file_size_download as i64;
    let start = Instant::now();
    let body = if status.is_success() || status.as_u16() == 429 {
        match resp.bytes().await {
            Ok(b) if (b.len() as i64) <= max_size => Some(b.to_vec()),
            Ok(_) => {
                return FetchOutput::failed("File size too large");
            }
            Err(_) => None,
        }
    } else {
        None
    };
    let _elapsed = start.elapsed();

    let size = body.as_ref().map(|b| b.len() as i64).unwrap_or(declared_size);

    let outcome = if status.as_u16() >= 400 && status.as_u16() != 429 {
        CheckOutcome::Failed {
            result: format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or("")),
            info: Vec::new(),
            warnings,
        }
    } else {
        CheckOutcome::Ok {
            info: Vec::new(),
            warnings,
        }
    };

    FetchOutput {
        outcome,
        body,
        content_type,
        content_encoding,
        size,
        aliases,
        extra_links,
        ssl_cert: None,
        skip_content: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_stati_matches_requests_library() {
        assert_eq!(REDIRECT_STATI, &[301, 302, 303, 307, 308]);
    }

    #[test]
    fn refresh_header_parses_url() {
        let caps = REFRESH_RE.captures("5; url=/next").unwrap();
        assert_eq!(&caps["url"], "/next");
    }
}
