//! linkchecker - crawls a set of seed URLs, recursively fetches linked
//! resources up to a bounded depth, verifies that each resolves, and
//! reports the result (`spec.md` §1-§9). See `cli::Args` for the full
//! flag set and `Config` for the `[checking]`/`[filtering]`/
//! `[authentication]`/`[output]` file format.

use std::io::Read as _;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use clap::Parser;
use owo_colors::OwoColorize;

mod aggregate;
mod cache;
mod checkers;
mod cli;
mod config;
mod cookies;
mod error;
mod extract;
mod logger;
mod plugins;
mod queue;
mod robots;
mod throttle;
mod url_norm;
mod urlobj;
mod worker;

use crate::aggregate::Aggregate;
use crate::config::Config;
use crate::error::{debug, DebugChannel, Log, Res, ResExt};
use crate::logger::{LoggerFanout, RunStats};
use crate::queue::UrlQueue;
use crate::urlobj::PendingLink;

pub(crate) static ARGS: LazyLock<cli::Args> =
    LazyLock::new(|| cli::Args::parse().finish_parsing());

fn list_plugins() {
    println!("Registered plugins:");
    println!("  AnchorCheck  - verify in-page #fragment anchors resolve against the fetched document");
}

fn seed_urls(args: &cli::Args) -> Res<Vec<String>> {
    let mut seeds = args.urls.clone();
    if args.stdin {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read seed URLs from stdin")?;
        seeds.extend(input.split_whitespace().map(str::to_string));
    }
    if seeds.is_empty() {
        return Err(std::io::Error::other("No seed URLs given; pass one or more URLs or --stdin").into());
    }
    Ok(seeds)
}

/// Startup login flow (§4.9, §7 kind-4): a cookie-file or login failure
/// is a recoverable infrastructure error, logged as a warning with the
/// feature simply skipped for the rest of the run rather than aborting.
async fn adopt_cookies(agg: &Aggregate) -> Res<()> {
    if let Some(path) = agg.config.cookie_file.clone() {
        if let Err(e) = cookies::load_file(&agg.cookie_jar, &path) {
            format!("Failed to load cookie file '{path}': {e}")
                .log("[WARN]")
                .await?;
        }
    }

    if let Some(login_url) = agg.config.login_url.clone() {
        let (user, password) = agg.config.user_password_for(&login_url);
        match (user, password) {
            (Some(user), Some(password)) => {
                if let Err(e) = cookies::login(
                    &agg.http_client,
                    &login_url,
                    &user,
                    &password,
                    &agg.config.login_user_field,
                    &agg.config.login_password_field,
                    &agg.config.login_extra_fields,
                )
                .await
                {
                    format!("Login at '{login_url}' failed: {e}").log("[WARN]").await?;
                }
            }
            _ => {
                format!("Login URL '{login_url}' configured but no username/password given; skipping login")
                    .log("[WARN]")
                    .await?;
            }
        }
    }
    Ok(())
}

async fn run() -> Res<i32> {
    let args = &*ARGS;

    if args.list_plugins {
        list_plugins();
        return Ok(0);
    }

    let mut config = Config::load(args).context("Failed to load configuration")?;
    let seeds = seed_urls(args)?;
    config.derive_intern_from_seeds(&seeds);

    debug(DebugChannel::Cmdline, || {
        format!("threads={} recursion_level={} output={}", config.threads, config.recursion_level, config.output)
    })
    .await;

    let agg = Arc::new(Aggregate::new(config)?);
    adopt_cookies(&agg).await?;

    let queue = Arc::new(UrlQueue::new());
    queue.push_many(seeds.iter().cloned().map(PendingLink::seed));

    let logger = Arc::new(LoggerFanout::from_config(&agg.config)?);
    logger.start(&seeds);

    debug(DebugChannel::Thread, || {
        format!("starting run with {} seed(s)", seeds.len())
    })
    .await;

    let start = Instant::now();

    let status_handle = if agg.config.status {
        let status_agg = Arc::clone(&agg);
        let wait = Duration::from_secs(agg.config.status_wait_seconds.max(1));
        Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(wait).await;
                eprintln!("{} {} URL(s) checked so far...", "status:".yellow(), status_agg.checked_count());
            }
        }))
    } else {
        None
    };

    let run_future = worker::run(Arc::clone(&agg), Arc::clone(&queue), Arc::clone(&logger));

    let summary = if let Some(max_secs) = agg.config.max_run_seconds {
        let watchdog_agg = Arc::clone(&agg);
        let watchdog_queue = Arc::clone(&queue);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(max_secs)).await;
            watchdog_agg.stop();
            watchdog_queue.shutdown();
        });

        let overall_budget = Duration::from_secs(max_secs + agg.config.abort_timeout);
        match tokio::time::timeout(overall_budget, run_future).await {
            Ok(summary) => summary,
            Err(_) => {
                "Run exceeded its abort timeout; remaining workers were abandoned"
                    .to_string()
                    .log("[WARN]")
                    .await?;
                queue.shutdown();
                worker::RunSummary {
                    checked: agg.checked_count(),
                    errors: 1,
                    warnings: 0,
                }
            }
        }
    } else {
        run_future.await
    };

    if let Some(handle) = status_handle {
        handle.abort();
    }

    let duration = start.elapsed();
    logger.end(&RunStats {
        checked: summary.checked,
        errors: summary.errors,
        warnings: summary.warnings,
        duration,
    });

    if agg.config.status {
        eprintln!(
            "{} {} URL(s) checked, {} error(s), {} warning(s) in {:.1}s",
            "Summary:".bold(),
            summary.checked,
            summary.errors,
            summary.warnings,
            duration.as_secs_f64()
        );
    }

    let exit_code = if summary.errors > 0 || (agg.config.warnings && summary.warnings > 0) {
        1
    } else {
        0
    };
    Ok(exit_code)
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run().await {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("{} {}", "FATAL:".red().bold(), e);
            std::process::ExitCode::from(2)
        }
    }
}
