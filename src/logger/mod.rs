//! Result logging fan-out (C13, `spec.md` §4.7 step 8 / §6 `-o`/`-F`),
//! ported from `examples/original_source/linkcheck/logger/__init__.py`'s
//! `Logger` base class. One call per finished `UrlObject`, one call to
//! start a run, one to end it; the whole record is atomic under
//! `logger_lock` (§5's lock table), which is why every worker reaches
//! loggers only through the shared `LoggerFanout`, never a bare `Logger`.
//!
//! `text`/`json`/`csv`/`failures`/`none` are full implementations; the
//! remaining output types the spec's `-o` table names (`html`, `gml`,
//! `dot`, `gxml`, `xml`, `sql`) are thinner siblings sharing this same
//! trait and fan-out machinery (§10) so that flag never fails to resolve.

pub(crate) mod csv;
pub(crate) mod dot;
pub(crate) mod failures;
pub(crate) mod gml;
pub(crate) mod gxml;
pub(crate) mod html;
pub(crate) mod json;
pub(crate) mod none;
pub(crate) mod sql;
pub(crate) mod text;
pub(crate) mod xml;

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::Config;
use crate::error::Res;
use crate::urlobj::UrlObject;

/// Final-summary numbers handed to every logger's `end()` (the teacher's
/// equivalent of `crawn`'s closing status line in `main.rs`).
pub(crate) struct RunStats {
    pub(crate) checked: u64,
    pub(crate) errors: u64,
    pub(crate) warnings: u64,
    pub(crate) duration: Duration,
}

pub(crate) trait Logger: Send {
    fn start(&mut self, _seeds: &[String]) {}

    fn log_url(&mut self, obj: &UrlObject);

    fn end(&mut self, _stats: &RunStats) {}
}

fn writer_for(path: Option<&str>) -> Res<Box<dyn Write + Send>> {
    match path {
        Some(p) => {
            let file = std::fs::OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(p)?;
            Ok(Box::new(std::io::BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}

/// Resolve `-o`/`-F`'s `<type[/enc[/file]]>` shape (§6) into a concrete
/// `Logger`. `file` is `None` for the primary `-o` logger, which always
/// targets stdout; `-F` entries carry an explicit file as their third
/// `/`-separated component.
pub(crate) fn build(kind: &str, file: Option<&str>, config: &Config) -> Res<Box<dyn Logger>> {
    if kind == "none" {
        return Ok(Box::new(none::NoneLogger));
    }
    if kind == "failures" {
        return Ok(Box::new(failures::FailuresLogger::load(file)?));
    }

    let out = writer_for(file)?;
    Ok(match kind {
        "csv" => Box::new(csv::CsvLogger::new(out)),
        "json" => Box::new(json::JsonLogger::new(out)),
        "html" => Box::new(html::HtmlLogger::new(out)),
        "gml" => Box::new(gml::GmlLogger::new(out)),
        "dot" => Box::new(dot::DotLogger::new(out)),
        "gxml" => Box::new(gxml::GxmlLogger::new(out)),
        "xml" => Box::new(xml::XmlLogger::new(out)),
        "sql" => Box::new(sql::SqlLogger::new(out)),
        _ => Box::new(text::TextLogger::new(out, config.warnings, config.verbose)),
    })
}

/// Split a `-F` spec's `type[/enc[/file]]` shape; encoding is accepted
/// and ignored (no transcoding layer, §1 "out of scope ... i18n").
fn split_file_spec(spec: &str) -> (&str, Option<&str>) {
    let mut parts = spec.splitn(3, '/');
    let kind = parts.next().unwrap_or(spec);
    let file = parts.nth(1);
    (kind, file)
}

/// The fan-out every worker actually holds: the primary `-o` logger,
/// zero or more `-F` file loggers, and an optional `failures` logger —
/// all driven under one lock so a single URL's record is never
/// interleaved with another's (§5, `logger_lock`).
pub(crate) struct LoggerFanout {
    inner: Mutex<Vec<Box<dyn Logger>>>,
}

impl LoggerFanout {
    pub(crate) fn from_config(config: &Config) -> Res<Self> {
        let (primary_kind, _) = split_file_spec(&config.output);
        let mut loggers = vec![build(primary_kind, None, config)?];

        for spec in &config.file_output {
            let (kind, file) = split_file_spec(spec);
            loggers.push(build(kind, file, config)?);
        }

        if let Some(path) = config.failures_file.clone() {
            loggers.push(build("failures", Some(&path), config)?);
        }

        Ok(LoggerFanout { inner: Mutex::new(loggers) })
    }

    pub(crate) fn start(&self, seeds: &[String]) {
        let mut loggers = self.inner.lock().expect("logger mutex poisoned");
        for logger in loggers.iter_mut() {
            logger.start(seeds);
        }
    }

    pub(crate) fn log_url(&self, obj: &UrlObject) {
        let mut loggers = self.inner.lock().expect("logger mutex poisoned");
        for logger in loggers.iter_mut() {
            logger.log_url(obj);
        }
    }

    pub(crate) fn end(&self, stats: &RunStats) {
        let mut loggers = self.inner.lock().expect("logger mutex poisoned");
        for logger in loggers.iter_mut() {
            logger.end(stats);
        }
    }
}
