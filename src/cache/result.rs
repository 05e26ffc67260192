//! Result cache (C5, `spec.md` §4.5/§4.7 step 4): `cache_url ->` finished
//! check result, guaranteeing at-most-once full check per fingerprint.
//!
//! A `cache_url` that is mid-check is represented by an `InProgress`
//! sentinel carrying a `Notify`; any concurrently dequeued `UrlObject`
//! with the same fingerprint waits on it instead of starting a second
//! network round-trip, then copies the finished result once the owner is
//! done (§4.7 step 4: "a sentinel marks check in progress ... waiters
//! transition to `cached`").

use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use super::BoundedStore;

/// The minimal result a cached duplicate needs — everything a logger or a
/// child `UrlObject` might read off an already-checked URL.
#[derive(Debug, Clone)]
pub(crate) struct CachedResult {
    pub(crate) valid: bool,
    pub(crate) result: String,
    pub(crate) info: Vec<String>,
    pub(crate) warnings: Vec<(String, String)>,
    pub(crate) content_type: Option<String>,
}

enum Slot {
    InProgress(Arc<Notify>),
    Done(CachedResult),
}

pub(crate) enum ClaimOutcome {
    /// No one else is checking this fingerprint; caller owns the check and
    /// must call `finish` when done.
    Owner,
    /// Another worker is already checking this fingerprint; wait on the
    /// `Notify` then call `get` again.
    WaitOn(Arc<Notify>),
    /// Already finished; here's the cached result.
    Cached(CachedResult),
}

pub(crate) struct ResultCache {
    inner: Mutex<BoundedStore<Slot>>,
}

impl ResultCache {
    pub(crate) fn new(max_size: usize) -> Self {
        ResultCache {
            inner: Mutex::new(BoundedStore::new(max_size)),
        }
    }

    /// Attempt to become the owner of this fingerprint's check. Must be
    /// called before a scheme checker's `fetch` step runs.
    pub(crate) async fn claim(&self, cache_url: &str) -> ClaimOutcome {
        let mut store = self.inner.lock().await;
        match store.get(cache_url) {
            Some(Slot::Done(r)) => ClaimOutcome::Cached(r.clone()),
            Some(Slot::InProgress(n)) => ClaimOutcome::WaitOn(Arc::clone(n)),
            None => {
                store.put(cache_url.to_string(), Slot::InProgress(Arc::new(Notify::new())));
                ClaimOutcome::Owner
            }
        }
    }

    /// Owner calls this once the check is finished; wakes every waiter.
    pub(crate) async fn finish(&self, cache_url: &str, result: CachedResult) {
        let notify = {
            let mut store = self.inner.lock().await;
            let prev = store.get(cache_url);
            let notify = match prev {
                Some(Slot::InProgress(n)) => Some(Arc::clone(n)),
                _ => None,
            };
            store.put(cache_url.to_string(), Slot::Done(result));
            notify
        };
        if let Some(n) = notify {
            n.notify_waiters();
        }
    }

    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CachedResult {
        CachedResult {
            valid: true,
            result: "200 OK".into(),
            info: vec![],
            warnings: vec![],
            content_type: Some("text/html".into()),
        }
    }

    #[tokio::test]
    async fn first_claim_is_owner_second_waits() {
        let cache = ResultCache::new(10);
        assert!(matches!(cache.claim("u").await, ClaimOutcome::Owner));
        assert!(matches!(cache.claim("u").await, ClaimOutcome::WaitOn(_)));
    }

    #[tokio::test]
    async fn finish_makes_later_claims_cached() {
        let cache = ResultCache::new(10);
        assert!(matches!(cache.claim("u").await, ClaimOutcome::Owner));
        cache.finish("u", sample()).await;
        match cache.claim("u").await {
            ClaimOutcome::Cached(r) => assert_eq!(r.result, "200 OK"),
            _ => panic!("expected cached result"),
        }
    }

    #[tokio::test]
    async fn waiter_is_woken_on_finish() {
        let cache = Arc::new(ResultCache::new(10));
        assert!(matches!(cache.claim("u").await, ClaimOutcome::Owner));
        let notify = match cache.claim("u").await {
            ClaimOutcome::WaitOn(n) => n,
            _ => panic!("expected waiter"),
        };
        let cache2 = Arc::clone(&cache);
        let waiter = tokio::spawn(async move {
            notify.notified().await;
            matches!(cache2.claim("u").await, ClaimOutcome::Cached(_))
        });
        cache.finish("u", sample()).await;
        assert!(waiter.await.unwrap());
    }
}
