//! Robots.txt cache (C3, `spec.md` §4.3): per-`(scheme, host, port)`
//! fetch, parse, and `allows(url, agent)`. A fetch failure is treated as
//! "allows everything" — it never gates the crawl on a network error.

use std::collections::HashMap;

use texting_robots::Robot;
use tokio::sync::Mutex;

pub(crate) struct RobotsEntry {
    robot: Option<Robot>,
}

impl RobotsEntry {
    fn allow_all() -> Self {
        RobotsEntry { robot: None }
    }

    pub(crate) fn allows(&self, path_and_query: &str) -> bool {
        match &self.robot {
            None => true,
            Some(r) => r.allowed(path_and_query),
        }
    }
}

pub(crate) struct RobotsCache {
    entries: Mutex<HashMap<String, RobotsEntry>>,
    client: reqwest::Client,
    user_agent: String,
}

fn key(scheme: &str, host: &str, port: Option<u16>) -> String {
    match port {
        Some(p) => format!("{scheme}://{host}:{p}"),
        None => format!("{scheme}://{host}"),
    }
}

impl RobotsCache {
    pub(crate) fn new(client: reqwest::Client, user_agent: String) -> Self {
        RobotsCache {
            entries: Mutex::new(HashMap::new()),
            client,
            user_agent,
        }
    }

    /// "May `agent` fetch `url`?" — fetches and parses `/robots.txt` for
    /// this `(scheme, host, port)` on first need, then reuses the parsed
    /// entry for the rest of the process lifetime (`spec.md` §3
    /// `RobotsEntry`: "kept for the process lifetime").
    pub(crate) async fn allows_url(
        &self,
        scheme: &str,
        host: &str,
        port: Option<u16>,
        path_and_query: &str,
    ) -> bool {
        let k = key(scheme, host, port);

        {
            let entries = self.entries.lock().await;
            if let Some(entry) = entries.get(&k) {
                return entry.allows(path_and_query);
            }
        }

        let robots_url = match port {
            Some(p) => format!("{scheme}://{host}:{p}/robots.txt"),
            None => format!("{scheme}://{host}/robots.txt"),
        };

        let entry = self.fetch_and_parse(&robots_url).await;
        let allowed = entry.allows(path_and_query);

        let mut entries = self.entries.lock().await;
        entries.entry(k).or_insert(entry);
        allowed
    }

    async fn fetch_and_parse(&self, robots_url: &str) -> RobotsEntry {
        let body = match self.client.get(robots_url).send().await {
            Ok(resp) if resp.status().is_success() => resp.bytes().await.ok(),
            _ => None,
        };

        match body {
            Some(bytes) => match Robot::new(&self.user_agent, &bytes) {
                Ok(robot) => RobotsEntry { robot: Some(robot) },
                Err(_) => RobotsEntry::allow_all(),
            },
            None => RobotsEntry::allow_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_failure_allows_everything() {
        let client = reqwest::Client::new();
        let cache = RobotsCache::new(client, "linkchecker-test".to_string());
        // Port 1 is reserved/unroutable in practice; the fetch should fail
        // fast and fall back to allow-everything rather than gating.
        let allowed = cache
            .allows_url("http", "127.0.0.1", Some(1), "/secret")
            .await;
        assert!(allowed);
    }
}
