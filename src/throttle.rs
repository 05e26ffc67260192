//! Per-host throttle (C6, `spec.md` §4.6), ported from
//! `examples/original_source/linkcheck/director/aggregator.py`
//! (`wait_for_host`, `set_maxrated_for_host`).
//!
//! The throttle lock is held across the bounded `sleep` — the one
//! documented exception to "never hold a lock across a blocking call"
//! (`spec.md` §5, last paragraph).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct State {
    earliest: HashMap<String, Instant>,
    max_rated: HashSet<String>,
}

pub(crate) struct HostThrottle {
    state: Mutex<State>,
    max_requests_per_second: f64,
}

impl HostThrottle {
    pub(crate) fn new(max_requests_per_second: f64) -> Self {
        HostThrottle {
            state: Mutex::new(State {
                earliest: HashMap::new(),
                max_rated: HashSet::new(),
            }),
            max_requests_per_second,
        }
    }

    /// §4.6 steps 1-5, field for field.
    pub(crate) async fn wait_for_host(&self, host: &str) {
        let mut state = self.state.lock().await;

        let mut now = Instant::now();
        if let Some(earliest) = state.earliest.get(host) {
            if *earliest > now {
                tokio::time::sleep(*earliest - now).await;
                now = Instant::now();
            }
        }

        let (min_wait, max_wait) = if state.max_rated.contains(host) {
            let floor = 1.0 / self.max_requests_per_second;
            let ceil = 6.0 / self.max_requests_per_second;
            (floor, ceil)
        } else {
            (0.1_f64.max(1.0 / self.max_requests_per_second), 0.6_f64.max(6.0 / self.max_requests_per_second))
        };

        let w_secs = if max_wait > min_wait {
            rand::rng().random_range(min_wait..max_wait)
        } else {
            min_wait
        };
        let wait = Duration::from_secs_f64(w_secs.max(0.0));
        state
            .earliest
            .insert(host.to_string(), now + wait);
    }

    /// Called when a response header indicates cooperation (e.g. a
    /// `LinkChecker:` echo), widening the host's interval back to its
    /// configured floor.
    pub(crate) async fn set_maxrated(&self, host: &str) {
        let mut state = self.state.lock().await;
        state.max_rated.insert(host.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;

    #[tokio::test]
    async fn second_wait_for_same_host_is_delayed() {
        let throttle = HostThrottle::new(1000.0); // fast floor for the test
        let start = StdInstant::now();
        throttle.wait_for_host("example.com").await;
        throttle.wait_for_host("example.com").await;
        assert!(start.elapsed() >= Duration::from_millis(1));
    }

    #[tokio::test]
    async fn max_rated_uses_configured_floor() {
        let throttle = HostThrottle::new(2.0);
        throttle.set_maxrated("example.com").await;
        throttle.wait_for_host("example.com").await;
        let state = throttle.state.lock().await;
        assert!(state.max_rated.contains("example.com"));
    }
}
