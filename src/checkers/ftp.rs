//! FTP checker, ported from
//! `examples/original_source/linkcheck/checker/ftpurl.py`: login, `FEAT`
//! UTF-8 negotiation, `CWD` walk, `LIST` the parent, `RETR` the file (or
//! fabricate a directory index for recursion).

use suppaftp::AsyncFtpStream;

use crate::aggregate::Aggregate;
use crate::url_norm::UrlParts;

use super::{CheckOutcome, FetchOutput};

fn index_html(names: &[String]) -> Vec<u8> {
    let mut out = String::from("<html><body>\n");
    for name in names {
        let escaped = name.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
        out.push_str(&format!("<a href=\"{}\">{}</a>\n", escaped, escaped));
    }
    out.push_str("</body></html>\n");
    out.into_bytes()
}

fn split_dirs_and_filename(path: &str) -> (Vec<String>, String) {
    let trimmed = path.trim_matches('/');
    let mut parts: Vec<String> = trimmed.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect();
    let filename = parts.pop().unwrap_or_default();
    (parts, filename)
}

/// Entries ending in a name already matching the requested filename, or
/// `"<name>/"` when it turns out to be a directory missing its trailing
/// slash (§4.7 edge-case policy).
fn parse_list_names(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| line.split_whitespace().last())
        .map(str::to_string)
        .collect()
}

pub(crate) async fn check(agg: &Aggregate, parts: &UrlParts, url: &str) -> FetchOutput {
    let host = parts.host.clone().unwrap_or_default();
    let port = parts.port.unwrap_or(21);

    agg.throttle.wait_for_host(&host).await;

    let mut stream = match AsyncFtpStream::connect(format!("{host}:{port}")).await {
        Ok(s) => s,
        Err(e) => return FetchOutput::failed(format!("FTP connect failed: {e}")),
    };

    let (user, password) = agg.config.user_password_for(url);
    let login_result = match (&user, &password) {
        (Some(u), Some(p)) => stream.login(u, p).await,
        (Some(u), None) => stream.login(u, "").await,
        _ => stream.login("anonymous", "linkchecker@").await,
    };
    if let Err(e) = login_result {
        return FetchOutput::failed(format!("FTP login failed: {e}"));
    }

    let is_directory = parts.path.is_empty() || parts.path.ends_with('/');
    let (dirs, filename) = split_dirs_and_filename(&parts.path);

    if stream.cwd("/").await.is_err() {
        return FetchOutput::failed("FTP: cannot change to root directory");
    }
    for d in &dirs {
        if stream.cwd(d).await.is_err() {
            let _ = stream.quit().await;
            return FetchOutput::failed(format!("FTP: directory '{d}' not found"));
        }
    }

    if !is_directory && !filename.is_empty() {
        let listing = match stream.list(None).await {
            Ok(l) => l,
            Err(e) => {
                let _ = stream.quit().await;
                return FetchOutput::failed(format!("FTP LIST failed: {e}"));
            }
        };
        let names = parse_list_names(&listing);
        let mut effective_url = url.to_string();
        let mut warnings = Vec::new();
        if !names.iter().any(|n| n == &filename) {
            if names.iter().any(|n| n == &format!("{filename}/")) {
                if !url.ends_with('/') {
                    warnings.push((
                        "missing_slash",
                        "Missing trailing directory slash in ftp url.".to_string(),
                    ));
                    effective_url.push('/');
                }
                return fetch_directory(&mut stream, &filename, warnings, effective_url).await;
            }
            let _ = stream.quit().await;
            return FetchOutput::failed("550 File not found");
        }

        let data = match stream.retr_as_buffer(&filename).await {
            Ok(cursor) => cursor.into_inner(),
            Err(e) => {
                let _ = stream.quit().await;
                return FetchOutput::failed(format!("FTP RETR failed: {e}"));
            }
        };
        let _ = stream.quit().await;

        let size = data.len() as i64;
        let content_type = crate::extract::ContentKind::from_mime(&guess_mime(&filename))
            .map(|_| guess_mime(&filename));
        return FetchOutput {
            outcome: CheckOutcome::Ok { info: Vec::new(), warnings },
            body: Some(data),
            content_type,
            content_encoding: None,
            size,
            aliases: Vec::new(),
            extra_links: Vec::new(),
            ssl_cert: None,
            skip_content: false,
        };
    }

    fetch_directory(&mut stream, &filename, Vec::new(), url.to_string()).await
}

async fn fetch_directory(
    stream: &mut AsyncFtpStream,
    dirname: &str,
    warnings: Vec<(&'static str, String)>,
    _effective_url: String,
) -> FetchOutput {
    if !dirname.is_empty() && stream.cwd(dirname).await.is_err() {
        let _ = stream.quit().await;
        return FetchOutput::failed(format!("FTP: directory '{dirname}' not found"));
    }
    let listing = match stream.list(None).await {
        Ok(l) => l,
        Err(e) => {
            let _ = stream.quit().await;
            return FetchOutput::failed(format!("FTP LIST failed: {e}"));
        }
    };
    let _ = stream.quit().await;
    let names = parse_list_names(&listing);
    let body = index_html(&names);
    let size = body.len() as i64;
    FetchOutput {
        outcome: CheckOutcome::Ok { info: Vec::new(), warnings },
        body: Some(body),
        content_type: Some("text/html".to_string()),
        content_encoding: None,
        size,
        aliases: Vec::new(),
        extra_links: Vec::new(),
        ssl_cert: None,
        skip_content: false,
    }
}

/// A minimal extension-based MIME guess; `mimeutil.guess_mimetype`'s
/// full table is out of scope, an extension map covers the common case.
fn guess_mime(filename: &str) -> String {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "xml" => "text/xml",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_dirs_and_filename() {
        let (dirs, filename) = split_dirs_and_filename("/pub/linux/readme.txt");
        assert_eq!(dirs, vec!["pub", "linux"]);
        assert_eq!(filename, "readme.txt");
    }

    #[test]
    fn builds_index_html_with_links() {
        let html = index_html(&["a.txt".to_string(), "b/".to_string()]);
        let s = String::from_utf8(html).unwrap();
        assert!(s.contains("href=\"a.txt\""));
        assert!(s.contains("href=\"b/\""));
    }
}
