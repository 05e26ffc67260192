//! Default `-o text` logger: one human-readable block per URL, coloured
//! the way the teacher colours its own `[FATAL]`/`[INFO]` tags in
//! `error.rs`. Ported from `examples/original_source/linkcheck/logger/
//! text.py`'s field order (`URL`, `Name`, `Parent URL`, result line,
//! warnings).

use std::io::Write;

use owo_colors::OwoColorize;

use super::{Logger, RunStats};
use crate::urlobj::UrlObject;

pub(crate) struct TextLogger {
    out: Box<dyn Write + Send>,
    warnings: bool,
    verbose: bool,
}

impl TextLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>, warnings: bool, verbose: bool) -> Self {
        TextLogger { out, warnings, verbose }
    }
}

impl Logger for TextLogger {
    fn log_url(&mut self, obj: &UrlObject) {
        if obj.valid && obj.warnings.is_empty() && !self.verbose {
            return;
        }

        let _ = writeln!(self.out, "URL         {}", obj.url);
        if !obj.name.is_empty() {
            let _ = writeln!(self.out, "Name        {}", obj.name);
        }
        if let Some(parent) = &obj.parent_url {
            let _ = writeln!(self.out, "Parent URL  {parent}");
        }

        if obj.valid {
            let _ = writeln!(self.out, "Result      {}", "Valid".green());
        } else {
            let _ = writeln!(self.out, "Result      {} {}", "Error".red().bold(), obj.result);
        }

        if self.warnings {
            for (tag, msg) in &obj.warnings {
                let _ = writeln!(self.out, "Warning     [{}] {}", tag.yellow(), msg);
            }
        }

        let _ = writeln!(self.out);
    }

    fn end(&mut self, stats: &RunStats) {
        let _ = writeln!(
            self.out,
            "That's it. {} URL{} checked, {} error{}, {} warning{} found in {:.1} seconds.",
            stats.checked,
            if stats.checked == 1 { "" } else { "s" },
            stats.errors,
            if stats.errors == 1 { "" } else { "s" },
            stats.warnings,
            if stats.warnings == 1 { "" } else { "s" },
            stats.duration.as_secs_f64(),
        );
        let _ = self.out.flush();
    }
}
