use std::path::PathBuf;

use clap::ValueHint;

use crate::error::DebugChannel;

static LONG_ABT: &str = r#"
linkchecker - crawls a set of seed URLs, recursively fetches linked
resources up to a bounded depth, verifies that each link resolves
successfully, and reports the result.

• Supports HTTP/HTTPS, FTP, file, mailto, DNS, itms-services and other
  schemes.
• Parses HTML, XML sitemaps, CSS and plain-text URL lists to discover
  further links.
• Honours robots.txt, HTML robots meta directives, cookies,
  authentication, redirects and per-host rate limits.
"#;

#[derive(clap::Parser)]
#[command(
    author,
    version,
    about = "A recursive, concurrent link checker",
    long_about = LONG_ABT
)]
pub struct Args {
    /// Seed URLs to start crawling from.
    #[arg(value_hint = ValueHint::Url)]
    pub urls: Vec<String>,

    /// Path to a configuration file (`[checking]`/`[filtering]`/
    /// `[authentication]`/`[output]` sections).
    #[arg(short = 'f', long = "config", value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    /// Number of worker threads. `<= 0` disables threading (serial mode).
    #[arg(short = 't', long = "threads", allow_negative_numbers = true)]
    pub threads: Option<i32>,

    /// Recursion depth. Negative means unbounded.
    #[arg(short = 'r', long = "recursion-level", allow_negative_numbers = true)]
    pub recursion_level: Option<i32>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enumerate registered plugins and exit.
    #[arg(long = "list-plugins")]
    pub list_plugins: bool,

    /// Read whitespace-separated seed URLs from stdin.
    #[arg(long)]
    pub stdin: bool,

    /// Enable a debug logger channel; may repeat. `all` enables every
    /// channel.
    #[arg(short = 'D', long = "debug", value_delimiter = ',')]
    pub debug_raw: Vec<String>,

    /// Add a file logger `type[/encoding[/filename]]`; may repeat.
    #[arg(short = 'F', long = "file-output")]
    pub file_output: Vec<String>,

    /// Suppress the status line.
    #[arg(long = "no-status")]
    pub no_status: bool,

    /// Suppress warnings in the output.
    #[arg(long = "no-warnings")]
    pub no_warnings: bool,

    /// Primary logger type: text, html, csv, json, gml, dot, gxml, xml,
    /// sql, failures, none.
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Alias for `-o none`.
    #[arg(short = 'q', long = "quiet", conflicts_with = "output")]
    pub quiet: bool,

    /// Log every URL, not only errors.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Log file for operational/debug output (as opposed to the result
    /// logger set with `-o`/`-F`).
    #[arg(short = 'l', long = "log-file", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// RFC-805-format cookie jar to seed the crawl with.
    #[arg(long = "cookiefile", value_hint = ValueHint::FilePath)]
    pub cookie_file: Option<PathBuf>,

    /// Ignore robots.txt entirely.
    #[arg(long = "no-robots")]
    pub no_robots: bool,

    /// Recurse into external URLs too (by default externs are only
    /// syntax-checked).
    #[arg(long = "check-extern")]
    pub check_extern: bool,

    /// Only syntax-check URLs matching this regex; may repeat.
    #[arg(long = "ignore-url")]
    pub ignore_url: Vec<String>,

    /// Check but do not recurse into URLs matching this regex; may
    /// repeat.
    #[arg(long = "no-follow-url")]
    pub no_follow_url: Vec<String>,

    /// HTTP/FTP username.
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,

    /// Prompt for an HTTP/FTP password on the tty.
    #[arg(short = 'p', long = "password-prompt")]
    pub password_prompt: bool,

    /// Override the `User-Agent` header.
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    #[arg(skip)]
    pub debug: std::collections::HashSet<DebugChannel>,

    #[arg(skip)]
    pub debug_all: bool,
}

impl Args {
    /// Resolve the raw `-D` strings into the channel set. Called once
    /// right after `clap::Parser::parse()`.
    pub(crate) fn finish_parsing(mut self) -> Self {
        for raw in &self.debug_raw {
            if raw == "all" {
                self.debug_all = true;
            } else if let Some(chan) = DebugChannel::parse(raw) {
                self.debug.insert(chan);
            }
        }
        self
    }
}
