//! The director/aggregator (C-glue, `spec.md` §4.9), ported from
//! `examples/original_source/linkcheck/director/aggregator.py`: owns
//! every shared resource a checking run needs and is handed to workers
//! by reference. One `Aggregate` per run, never per-worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::cache::anchor::AnchorCache;
use crate::cache::result::ResultCache;
use crate::config::Config;
use crate::error::Res;
use crate::plugins::PluginRegistry;
use crate::robots::RobotsCache;
use crate::throttle::HostThrottle;

pub(crate) struct Aggregate {
    pub(crate) config: Config,
    pub(crate) http_client: reqwest::Client,
    pub(crate) cookie_jar: Arc<Jar>,
    pub(crate) robots: RobotsCache,
    pub(crate) throttle: HostThrottle,
    pub(crate) result_cache: ResultCache,
    pub(crate) anchor_cache: AnchorCache,
    pub(crate) plugins: PluginRegistry,
    /// Count of URLs actually connected-to, for the final summary line.
    pub(crate) checked: AtomicU64,
    /// `director.py`'s `stopped` flag: set once `max_run_seconds` elapses
    /// or a shutdown is requested, checked by workers between URLs.
    pub(crate) stopped: std::sync::atomic::AtomicBool,
}

impl Aggregate {
    pub(crate) fn new(config: Config) -> Res<Self> {
        let cookie_jar = Arc::new(Jar::default());
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout))
            .danger_accept_invalid_certs(!config.ssl_verify)
            .redirect(reqwest::redirect::Policy::none())
            .cookie_provider(cookie_jar.clone())
            .build()?;

        let robots = RobotsCache::new(http_client.clone(), config.user_agent.clone());
        let throttle = HostThrottle::new(config.max_requests_per_second);
        let result_cache = ResultCache::new(config.result_cache_size);
        let anchor_cache = AnchorCache::new(config.anchor_cache_size);
        let plugins = PluginRegistry::enabled(&config.enabled_plugins);

        Ok(Aggregate {
            config,
            http_client,
            cookie_jar,
            robots,
            throttle,
            result_cache,
            anchor_cache,
            plugins,
            checked: AtomicU64::new(0),
            stopped: std::sync::atomic::AtomicBool::new(false),
        })
    }

    pub(crate) fn record_checked(&self) {
        self.checked.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn checked_count(&self) -> u64 {
        self.checked.load(Ordering::Relaxed)
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    pub(crate) fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    /// `check_extern` / `intern_links` / `extern_links` classification
    /// (§4.5, §6): a link is extern when it matches an `extern_links`
    /// pattern and no `intern_links` pattern overrides it.
    pub(crate) fn is_extern(&self, url: &str) -> bool {
        let matches_extern = self.config.extern_links.iter().any(|re| re.is_match(url));
        let matches_intern = self.config.intern_links.iter().any(|re| re.is_match(url));
        matches_extern && !matches_intern
    }

    pub(crate) fn is_ignored_error(&self, message: &str) -> bool {
        self.config.ignore_errors.iter().any(|re| re.is_match(message))
    }

    pub(crate) fn is_no_follow(&self, url: &str) -> bool {
        self.config.no_follow_url.iter().any(|re| re.is_match(url))
    }

    /// `ignorewarnings` (§4 step 5 / §9 filtering): a warning tag listed
    /// here is dropped before it can count toward exit code 1.
    pub(crate) fn is_ignored_warning(&self, tag: &str) -> bool {
        self.config.ignore_warnings.iter().any(|t| t == tag)
    }
}
