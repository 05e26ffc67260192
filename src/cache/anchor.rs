//! Anchor cache (C4, `spec.md` §4.4): `cache_url -> {kind -> payload}`,
//! bounded and LFU-evicted. Used by `AnchorCheck` so a page's anchor set
//! is parsed at most once even when dozens of links reference different
//! fragments of it.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use super::BoundedStore;

/// The payload kinds stashed per `cache_url`. `spec.md` only names the
/// anchor set, but the cache shape (§3 "and other per-URL reusable
/// artefacts") is generic, so this is a small open enum rather than a
/// single `HashSet<String>` field.
#[derive(Debug, Clone)]
pub(crate) enum AnchorPayload {
    /// The set of anchor names found on the page (`id=`/`a[name]`),
    /// percent-decoded (Design Note (c)).
    Anchors(HashSet<String>),
}

pub(crate) struct AnchorCache {
    inner: Mutex<BoundedStore<HashMap<&'static str, AnchorPayload>>>,
}

impl AnchorCache {
    pub(crate) fn new(max_size: usize) -> Self {
        AnchorCache {
            inner: Mutex::new(BoundedStore::new(max_size)),
        }
    }

    /// `get(key, kind)` — miss returns `None`.
    pub(crate) async fn get_anchors(&self, key: &str) -> Option<HashSet<String>> {
        let store = self.inner.lock().await;
        match store.get(key)?.get("anchors")? {
            AnchorPayload::Anchors(set) => Some(set.clone()),
        }
    }

    /// `put(key, kind, payload)`.
    pub(crate) async fn put_anchors(&self, key: String, anchors: HashSet<String>) {
        let mut store = self.inner.lock().await;
        let entry = store.get_mut(&key);
        match entry {
            Some(map) => {
                map.insert("anchors", AnchorPayload::Anchors(anchors));
            }
            None => {
                let mut map = HashMap::new();
                map.insert("anchors", AnchorPayload::Anchors(anchors));
                store.put(key, map);
            }
        }
    }

    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = AnchorCache::new(10);
        assert!(cache.get_anchors("http://x/a").await.is_none());

        let mut anchors = HashSet::new();
        anchors.insert("myid".to_string());
        cache.put_anchors("http://x/a".to_string(), anchors.clone()).await;

        assert_eq!(cache.get_anchors("http://x/a").await, Some(anchors));
    }

    #[tokio::test]
    async fn eviction_drops_oldest_insertion() {
        let cache = AnchorCache::new(2);
        for i in 0..3 {
            cache
                .put_anchors(format!("http://x/{i}"), HashSet::new())
                .await;
        }
        assert_eq!(cache.len().await, 2);
        assert!(cache.get_anchors("http://x/0").await.is_none());
        assert!(cache.get_anchors("http://x/2").await.is_some());
    }

    #[tokio::test]
    async fn re_put_does_not_reorder() {
        let cache = AnchorCache::new(2);
        cache.put_anchors("a".into(), HashSet::new()).await;
        cache.put_anchors("b".into(), HashSet::new()).await;
        // re-inserting "a" must not move it to the back of the eviction order
        cache.put_anchors("a".into(), HashSet::new()).await;
        cache.put_anchors("c".into(), HashSet::new()).await;
        assert!(cache.get_anchors("a").await.is_none());
        assert!(cache.get_anchors("b").await.is_some());
        assert!(cache.get_anchors("c").await.is_some());
    }
}
