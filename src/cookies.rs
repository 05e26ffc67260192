//! Cookie jar adoption (§4.9/§6 "Cookie file format"), ported from
//! `examples/original_source/linkcheck/cookies.py` (`from_file`) and
//! `htmlutil/loginformsearch.py` (form discovery by input-name match).
//!
//! Two independent entry points, both called once at start-up from
//! `main.rs` before any worker starts: `load_file` seeds the shared jar
//! from an RFC-805-style cookie file, `login` drives the single
//! pre-crawl GET/POST exchange. Both failures are kind-4 recoverable
//! infrastructure errors (`spec.md` §7): the caller logs a warning and
//! disables the corresponding `Config` field rather than aborting the run.

use std::collections::HashMap;

use reqwest::cookie::Jar;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{Res, ResExt};

struct CookieBlock {
    host: String,
    scheme: String,
    path: String,
    set_cookies: Vec<String>,
}

/// RFC-805-style header blocks separated by blank lines: `Key: value`
/// lines, `Set-cookie` may repeat within a block.
fn parse_blocks(text: &str) -> Vec<CookieBlock> {
    let mut blocks = Vec::new();
    let mut host = None;
    let mut scheme = "http".to_string();
    let mut path = "/".to_string();
    let mut set_cookies = Vec::new();

    let flush = |host: &mut Option<String>,
                 scheme: &mut String,
                 path: &mut String,
                 set_cookies: &mut Vec<String>,
                 blocks: &mut Vec<CookieBlock>| {
        if let Some(h) = host.take() {
            if !set_cookies.is_empty() {
                blocks.push(CookieBlock {
                    host: h,
                    scheme: std::mem::replace(scheme, "http".to_string()),
                    path: std::mem::replace(path, "/".to_string()),
                    set_cookies: std::mem::take(set_cookies),
                });
            }
        }
        *scheme = "http".to_string();
        *path = "/".to_string();
        set_cookies.clear();
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut host, &mut scheme, &mut path, &mut set_cookies, &mut blocks);
            continue;
        }
        let Some((key, value)) = line.split_once(':') else { continue };
        let key = key.trim().to_lowercase();
        let value = value.trim().to_string();
        match key.as_str() {
            "host" => host = Some(value),
            "scheme" => scheme = value,
            "path" => path = value,
            "set-cookie" => set_cookies.push(value),
            _ => {}
        }
    }
    flush(&mut host, &mut scheme, &mut path, &mut set_cookies, &mut blocks);
    blocks
}

/// Seed `jar` from an RFC-805-format cookie file (`spec.md` §6). A parse
/// or I/O failure is surfaced to the caller as a `Res` so it can be
/// logged and downgraded to "feature disabled" rather than aborting.
pub(crate) fn load_file(jar: &Jar, path: &str) -> Res<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cookie file: {path}"))?;

    for block in parse_blocks(&text) {
        let base = format!("{}://{}{}", block.scheme, block.host, block.path);
        let url = Url::parse(&base)
            .with_context(|| format!("Invalid Host/Scheme/Path in cookie file: {base}"))?;
        for cookie in &block.set_cookies {
            jar.add_cookie_str(cookie, &url);
        }
    }
    Ok(())
}

/// Single pre-crawl login exchange (§4.9): GET the login URL, find the
/// first `<form>` whose inputs include the configured user field, POST
/// `{user, password, extra fields}` to the form's `action`. The client
/// passed in must already be built with `cookie_provider(jar)` so a
/// successful POST's `Set-Cookie` response is adopted automatically.
pub(crate) async fn login(
    client: &reqwest::Client,
    login_url: &str,
    user: &str,
    password: &str,
    user_field: &str,
    password_field: &str,
    extra_fields: &HashMap<String, String>,
) -> Res<()> {
    let resp = client
        .get(login_url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch login page: {login_url}"))?;
    let body = resp
        .text()
        .await
        .with_context(|| format!("Failed to read login page body: {login_url}"))?;

    let doc = Html::parse_document(&body);
    let form_sel = Selector::parse("form")
        .map_err(|e| std::io::Error::other(format!("bad form selector: {e:?}")))?;
    let input_sel = Selector::parse("input[name]")
        .map_err(|e| std::io::Error::other(format!("bad input selector: {e:?}")))?;

    let mut action = None;
    for form in doc.select(&form_sel) {
        let has_user_field = form
            .select(&input_sel)
            .any(|i| i.attr("name") == Some(user_field));
        if has_user_field {
            action = Some(form.attr("action").unwrap_or("").to_string());
            break;
        }
    }

    let Some(action) = action else {
        return Err(std::io::Error::other(format!(
            "No login form with a `{user_field}' field found at {login_url}"
        ))
        .into());
    };

    let action_url = Url::parse(login_url)
        .and_then(|base| base.join(&action))
        .with_context(|| format!("Invalid login form action: {action}"))?;

    let mut fields: Vec<(&str, &str)> = vec![(user_field, user), (password_field, password)];
    for (k, v) in extra_fields {
        fields.push((k.as_str(), v.as_str()));
    }

    let post_resp = client
        .post(action_url.as_str())
        .form(&fields)
        .send()
        .await
        .with_context(|| format!("Login POST failed: {action_url}"))?;

    if !post_resp.headers().contains_key(reqwest::header::SET_COOKIE) {
        return Err(std::io::Error::other(format!(
            "Login response from {action_url} set no cookies"
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_block() {
        let text = "Host: example.com\nPath: /app\nSet-cookie: sid=abc123\n";
        let blocks = parse_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].host, "example.com");
        assert_eq!(blocks[0].path, "/app");
        assert_eq!(blocks[0].scheme, "http");
        assert_eq!(blocks[0].set_cookies, vec!["sid=abc123".to_string()]);
    }

    #[test]
    fn parses_multiple_blocks_separated_by_blank_lines() {
        let text = "Host: a.com\nSet-cookie: x=1\n\nHost: b.com\nScheme: https\nSet-cookie: y=2\n";
        let blocks = parse_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].host, "b.com");
        assert_eq!(blocks[1].scheme, "https");
    }

    #[test]
    fn block_without_host_is_skipped() {
        let text = "Set-cookie: x=1\n";
        assert!(parse_blocks(text).is_empty());
    }
}
