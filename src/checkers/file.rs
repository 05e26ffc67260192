//! `file:` checker, ported from
//! `examples/original_source/linkcheck/checker/fileurl.py`: local
//! filesystem stat + read, directory listing fallback.

use std::path::{Path, PathBuf};

use crate::aggregate::Aggregate;
use crate::url_norm::UrlParts;

use super::{CheckOutcome, FetchOutput};

fn local_path(parts: &UrlParts) -> PathBuf {
    let decoded = crate::url_norm::decode(&parts.path);
    #[cfg(windows)]
    {
        PathBuf::from(decoded.trim_start_matches('/'))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from(decoded)
    }
}

fn index_html(dir: &Path, names: &[String]) -> Vec<u8> {
    let mut names = names.to_vec();
    names.sort();
    let mut out = format!("<html><body>\n<h1>Index of {}</h1>\n", dir.display());
    for name in names {
        out.push_str(&format!("<a href=\"{name}\">{name}</a><br>\n"));
    }
    out.push_str("</body></html>\n");
    out.into_bytes()
}

pub(crate) async fn check(agg: &Aggregate, parts: &UrlParts, _url: &str) -> FetchOutput {
    let path = local_path(parts);

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(m) => m,
        Err(e) => return FetchOutput::failed(format!("{}: {}", path.display(), e)),
    };

    if metadata.is_dir() {
        let mut names = Vec::new();
        let mut read = match tokio::fs::read_dir(&path).await {
            Ok(r) => r,
            Err(e) => return FetchOutput::failed(format!("{}: {}", path.display(), e)),
        };
        while let Ok(Some(entry)) = read.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            names.push(if is_dir { format!("{name}/") } else { name });
        }
        let body = index_html(&path, &names);
        let size = body.len() as i64;
        return FetchOutput {
            outcome: CheckOutcome::ok(),
            body: Some(body),
            content_type: Some("text/html".to_string()),
            content_encoding: None,
            size,
            aliases: Vec::new(),
            extra_links: Vec::new(),
            ssl_cert: None,
            skip_content: false,
        };
    }

    if metadata.len() > agg.config.max_file_size_download {
        return FetchOutput::failed(format!(
            "file size {} exceeds maximum of {} bytes",
            metadata.len(),
            agg.config.max_file_size_download
        ));
    }

    let data = match tokio::fs::read(&path).await {
        Ok(d) => d,
        Err(e) => return FetchOutput::failed(format!("{}: {}", path.display(), e)),
    };
    let size = data.len() as i64;
    let content_type = mime_guess_from_extension(&path);

    FetchOutput {
        outcome: CheckOutcome::ok(),
        body: Some(data),
        content_type,
        content_encoding: None,
        size,
        aliases: Vec::new(),
        extra_links: Vec::new(),
        ssl_cert: None,
        skip_content: false,
    }
}

fn mime_guess_from_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    Some(
        match ext.as_str() {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "xml" => "text/xml",
            "txt" => "text/plain",
            "swf" => "application/x-shockwave-flash",
            _ => return None,
        }
        .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_path_decodes_percent_escapes() {
        let parts = UrlParts {
            scheme: "file".to_string(),
            userinfo: None,
            host: None,
            port: None,
            path: "/tmp/my%20file.txt".to_string(),
            query: String::new(),
            fragment: String::new(),
        };
        assert_eq!(local_path(&parts), PathBuf::from("/tmp/my file.txt"));
    }

    #[test]
    fn mime_guessed_from_extension() {
        assert_eq!(
            mime_guess_from_extension(Path::new("a.html")).as_deref(),
            Some("text/html")
        );
        assert_eq!(mime_guess_from_extension(Path::new("a.unknownext")), None);
    }
}
