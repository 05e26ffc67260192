//! `-o failures`/`-F failures`: the persisted cross-run failure log
//! (`spec.md` §6 "Persisted state", glossary "Failures log"). Ported from
//! `examples/original_source/linkcheck/logger/failures.py`.
//!
//! On load, every `(parent, cache_url) -> count` line from a previous run
//! is read in. Each `log_url` call during this run increments the count
//! for a URL that's still failing, and decrements (floor zero) one that
//! now passes. `end()` rewrites the file keeping only entries that failed
//! in *this* run — a URL that passed drops out once its count reaches
//! zero, matching "only URLs still failing at end-of-run are kept".

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{Logger, RunStats};
use crate::urlobj::UrlObject;

static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(\d+)\s+"\((.*), (.*)\)"$"#).unwrap());

pub(crate) struct FailuresLogger {
    path: Option<String>,
    counts: HashMap<(String, String), u64>,
    failing_this_run: std::collections::HashSet<(String, String)>,
}

impl FailuresLogger {
    pub(crate) fn load(path: Option<&str>) -> crate::error::Res<Self> {
        let mut counts = HashMap::new();
        if let Some(p) = path {
            if let Ok(text) = std::fs::read_to_string(p) {
                for line in text.lines() {
                    if let Some(caps) = LINE_RE.captures(line.trim()) {
                        let count: u64 = caps[1].parse().unwrap_or(0);
                        let parent = caps[2].to_string();
                        let cache_url = caps[3].to_string();
                        counts.insert((parent, cache_url), count);
                    }
                }
            }
        }
        Ok(FailuresLogger {
            path: path.map(str::to_string),
            counts,
            failing_this_run: std::collections::HashSet::new(),
        })
    }
}

impl Logger for FailuresLogger {
    fn log_url(&mut self, obj: &UrlObject) {
        let key = (
            obj.parent_url.clone().unwrap_or_default(),
            obj.cache_url.clone(),
        );
        if obj.valid {
            if let Some(count) = self.counts.get_mut(&key) {
                *count = count.saturating_sub(1);
            }
        } else {
            *self.counts.entry(key.clone()).or_insert(0) += 1;
            self.failing_this_run.insert(key);
        }
    }

    fn end(&mut self, _stats: &RunStats) {
        let Some(path) = &self.path else { return };
        let mut lines = Vec::new();
        for (key, count) in &self.counts {
            if *count == 0 || !self.failing_this_run.contains(key) {
                continue;
            }
            lines.push(format!("{} \"({}, {})\"", count, key.0, key.1));
        }
        let _ = std::fs::write(path, lines.join("\n") + if lines.is_empty() { "" } else { "\n" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_norm::UrlParts;
    use crate::urlobj::UrlState;

    fn obj(parent: &str, cache_url: &str, valid: bool) -> UrlObject {
        UrlObject {
            base_url: cache_url.to_string(),
            parent_url: Some(parent.to_string()),
            base_ref: None,
            name: String::new(),
            line: None,
            column: None,
            page: 0,
            recursion_level: 0,
            url: cache_url.to_string(),
            parts: UrlParts {
                scheme: String::new(),
                userinfo: None,
                host: None,
                port: None,
                path: String::new(),
                query: String::new(),
                fragment: String::new(),
            },
            scheme: String::new(),
            anchor: String::new(),
            cache_url: cache_url.to_string(),
            is_extern: false,
            valid,
            result: String::new(),
            info: Vec::new(),
            warnings: Vec::new(),
            content_type: None,
            content_encoding: None,
            size: -1,
            dltime: 0.0,
            aliases: Vec::new(),
            ssl_cert: None,
            state: UrlState::Done,
        }
    }

    #[test]
    fn parses_persisted_line() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "2 \"(http://a/, http://a/b)\"\n").unwrap();
        let logger = FailuresLogger::load(Some(tmp.path().to_str().unwrap())).unwrap();
        assert_eq!(
            logger.counts.get(&("http://a/".to_string(), "http://a/b".to_string())),
            Some(&2)
        );
    }

    #[test]
    fn passing_url_decrements_and_is_not_rewritten() {
        let mut logger = FailuresLogger::load(None).unwrap();
        logger.log_url(&obj("http://a/", "http://a/b", false));
        logger.log_url(&obj("http://a/", "http://a/b", true));
        assert_eq!(
            logger.counts.get(&("http://a/".to_string(), "http://a/b".to_string())),
            Some(&0)
        );
    }
}
