//! Worker pool (C10, `spec.md` §4.9/§5), ported from the teacher's
//! `main.rs` task-spawn loop (`task_count` / `tokio::spawn` workers
//! pulling off a shared queue) and
//! `examples/original_source/linkcheck/director/aggregator.py`'s
//! `start_threads`/`finish`: each worker repeatedly pops a `PendingLink`,
//! drives it through the full `UrlObject` state machine, filters its
//! children by the configured recursion bound, re-enqueues them, and
//! hands the finished object to the logger fan-out. `threads <= 0` runs
//! this same loop once in the calling task instead of spawning any.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::aggregate::Aggregate;
use crate::logger::LoggerFanout;
use crate::queue::UrlQueue;
use crate::urlobj::UrlObject;

pub(crate) struct RunSummary {
    pub(crate) checked: u64,
    pub(crate) errors: u64,
    pub(crate) warnings: u64,
}

fn depth_ok(agg: &Aggregate, recursion_level: i32) -> bool {
    agg.config.recursion_level < 0 || recursion_level <= agg.config.recursion_level
}

async fn worker_loop(
    agg: Arc<Aggregate>,
    queue: Arc<UrlQueue>,
    logger: Arc<LoggerFanout>,
    errors: Arc<AtomicU64>,
    warnings: Arc<AtomicU64>,
) {
    loop {
        if agg.is_stopped() {
            queue.shutdown();
            break;
        }
        let Some(pending) = queue.pop().await else { break };

        let mut body = None;
        let (obj, children) = UrlObject::process(pending, &agg, &mut body).await;

        if !obj.valid {
            errors.fetch_add(1, Ordering::Relaxed);
        }
        warnings.fetch_add(obj.warnings.len() as u64, Ordering::Relaxed);

        for child in children {
            if depth_ok(&agg, child.recursion_level) {
                queue.push(child);
            }
        }

        logger.log_url(&obj);
        queue.mark_done();
    }
}

/// Drive the whole queue to completion: `threads > 0` spawns that many
/// workers and joins them, `threads <= 0` runs serially in the caller
/// (§4.9 "0-thread mode runs serially in the caller", §6 `-t N`).
pub(crate) async fn run(agg: Arc<Aggregate>, queue: Arc<UrlQueue>, logger: Arc<LoggerFanout>) -> RunSummary {
    let errors = Arc::new(AtomicU64::new(0));
    let warnings = Arc::new(AtomicU64::new(0));
    let threads = agg.config.threads;

    if threads <= 0 {
        worker_loop(
            Arc::clone(&agg),
            Arc::clone(&queue),
            Arc::clone(&logger),
            Arc::clone(&errors),
            Arc::clone(&warnings),
        )
        .await;
    } else {
        let mut handles = Vec::with_capacity(threads as usize);
        for _ in 0..threads {
            let agg = Arc::clone(&agg);
            let queue = Arc::clone(&queue);
            let logger = Arc::clone(&logger);
            let errors = Arc::clone(&errors);
            let warnings = Arc::clone(&warnings);
            handles.push(tokio::spawn(async move {
                worker_loop(agg, queue, logger, errors, warnings).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    RunSummary {
        checked: agg.checked_count(),
        errors: errors.load(Ordering::Relaxed),
        warnings: warnings.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logger::{self, RunStats};
    use crate::urlobj::PendingLink;
    use std::time::Duration;

    #[tokio::test]
    async fn serial_mode_drains_a_local_file_seed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.html");
        std::fs::write(&file, "<html><body>no links here</body></html>").unwrap();

        let mut config = Config::default();
        config.threads = 0;
        config.output = "none".to_string();
        let agg = Arc::new(Aggregate::new(config.clone()).unwrap());
        let queue = Arc::new(UrlQueue::new());
        let logger = Arc::new(LoggerFanout::from_config(&config).unwrap());

        queue.push(PendingLink::seed(format!("file://{}", file.display())));

        let summary = run(agg, queue, logger).await;
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.errors, 0);
    }

    #[tokio::test]
    async fn invalid_depth_children_are_dropped_before_enqueue() {
        let mut config = Config::default();
        config.recursion_level = 0;
        let agg = Aggregate::new(config).unwrap();
        assert!(depth_ok(&agg, 0));
        assert!(!depth_ok(&agg, 1));
        let _ = Duration::from_secs(0);
        let _: RunStats = RunStats { checked: 0, errors: 0, warnings: 0, duration: Duration::from_secs(0) };
        let _ = logger::build("none", None, &agg.config).unwrap();
    }
}
