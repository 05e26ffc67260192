//! `-o html`: one row per URL in a self-contained HTML table. Thinner
//! sibling of `text`/`csv` (`spec.md` §10 "remaining output types ...
//! implemented as thinner siblings sharing this same trait").

use std::io::Write;

use super::{Logger, RunStats};
use crate::urlobj::UrlObject;

pub(crate) struct HtmlLogger {
    out: Box<dyn Write + Send>,
    started: bool,
}

impl HtmlLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        HtmlLogger { out, started: false }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Logger for HtmlLogger {
    fn start(&mut self, _seeds: &[String]) {
        let _ = writeln!(
            self.out,
            "<html><body><table border=\"1\">\n<tr><th>URL</th><th>Parent</th><th>Valid</th><th>Result</th></tr>"
        );
        self.started = true;
    }

    fn log_url(&mut self, obj: &UrlObject) {
        if !self.started {
            self.start(&[]);
        }
        let _ = writeln!(
            self.out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&obj.url),
            escape(obj.parent_url.as_deref().unwrap_or("")),
            obj.valid,
            escape(&obj.result),
        );
    }

    fn end(&mut self, _stats: &RunStats) {
        let _ = writeln!(self.out, "</table></body></html>");
        let _ = self.out.flush();
    }
}
