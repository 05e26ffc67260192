//! The pending-link work queue (C9, `spec.md` §2/§4.9/§5), ported from
//! `examples/original_source/linkcheck/director/__init__.py`'s
//! `Aggregator.urlqueue`: a FIFO of not-yet-built links shared by every
//! worker, plus the in-flight counter a run needs to know when it's
//! actually finished (as opposed to merely empty for a moment while a
//! worker is still extracting children from a page).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::timeout;

use crate::urlobj::PendingLink;

pub(crate) struct UrlQueue {
    items: Mutex<VecDeque<PendingLink>>,
    /// Links pushed but not yet finished processing: `items.len()` plus
    /// however many are currently checked out by a worker. Reaches zero
    /// exactly when the run has nothing left to do.
    in_flight: AtomicI64,
    shutdown: AtomicBool,
    notify: Notify,
}

impl UrlQueue {
    pub(crate) fn new() -> Self {
        UrlQueue {
            items: Mutex::new(VecDeque::new()),
            in_flight: AtomicI64::new(0),
            shutdown: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Seed or enqueue a child link. Ignored once `shutdown()` has been
    /// called, so a worker unwinding from an aborted run doesn't keep
    /// growing the queue with newly discovered children.
    pub(crate) fn push(&self, link: PendingLink) {
        if self.shutdown.load(Ordering::Acquire) {
            return;
        }
        self.items.lock().expect("queue mutex poisoned").push_back(link);
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.notify.notify_one();
    }

    pub(crate) fn push_many(&self, links: impl IntoIterator<Item = PendingLink>) {
        for link in links {
            self.push(link);
        }
    }

    /// Wait for a link to become available, or for the run to be
    /// genuinely finished (`in_flight` reaches zero). Returns `None` in
    /// the latter case; workers exit their loop on `None`.
    pub(crate) async fn pop(&self) -> Option<PendingLink> {
        loop {
            // Register as a waiter *before* checking the conditions that
            // would make us wait, so a `notify_waiters()` fired between
            // our check and the `.await` below isn't lost (`Notify`
            // stores no permit for `notify_waiters` when nobody is
            // registered yet).
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(link) = self.items.lock().expect("queue mutex poisoned").pop_front() {
                return Some(link);
            }
            if self.in_flight.load(Ordering::Acquire) <= 0 || self.shutdown.load(Ordering::Acquire) {
                return None;
            }
            notified.await;
        }
    }

    /// A worker calls this once a dequeued link (and all of its
    /// newly-discovered children, already re-`push`ed) is fully
    /// accounted for.
    pub(crate) fn mark_done(&self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) <= 1 {
            self.notify.notify_waiters();
        }
    }

    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Block until `in_flight` reaches zero or `max_wait` elapses
    /// (`director.py`'s `abort_timeout`, §4.9/§6). Returns `false` on
    /// timeout, which the caller treats as an abort rather than a clean
    /// finish.
    pub(crate) async fn join(&self, max_wait: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                if self.in_flight.load(Ordering::Acquire) <= 0 || self.shutdown.load(Ordering::Acquire) {
                    return;
                }
                notified.await;
            }
        };
        timeout(max_wait, wait).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(url: &str) -> PendingLink {
        PendingLink::seed(url.to_string())
    }

    #[tokio::test]
    async fn pop_returns_none_once_drained() {
        let queue = UrlQueue::new();
        queue.push(seed("https://example.com/"));
        let link = queue.pop().await.expect("one link queued");
        assert_eq!(link.base_url, "https://example.com/");
        queue.mark_done();
        assert!(queue.pop().await.is_none());
    }

    #[tokio::test]
    async fn children_pushed_before_mark_done_keep_run_alive() {
        let queue = UrlQueue::new();
        queue.push(seed("https://example.com/"));
        let first = queue.pop().await.unwrap();
        queue.push(seed("https://example.com/child"));
        queue.mark_done();
        let second = queue.pop().await.expect("child still pending");
        assert_eq!(second.base_url, "https://example.com/child");
        assert_eq!(first.base_url, "https://example.com/");
        queue.mark_done();
        assert!(queue.pop().await.is_none());
    }

    #[tokio::test]
    async fn shutdown_stops_new_pushes_and_wakes_waiters() {
        let queue = UrlQueue::new();
        queue.push(seed("https://example.com/"));
        queue.pop().await;
        queue.shutdown();
        queue.push(seed("https://example.com/late"));
        assert!(queue.pop().await.is_none());
    }
}
