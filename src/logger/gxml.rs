//! `-o gxml`: GraphXML crawl graph, hand-emitted the same way `json`
//! hand-emits rather than pulling a DOM-building crate for a handful of
//! tags (§10 thinner sibling).

use std::io::Write;

use super::{Logger, RunStats};
use crate::urlobj::UrlObject;

pub(crate) struct GxmlLogger {
    out: Box<dyn Write + Send>,
}

impl GxmlLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        GxmlLogger { out }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl Logger for GxmlLogger {
    fn start(&mut self, _seeds: &[String]) {
        let _ = writeln!(self.out, "<?xml version=\"1.0\"?>\n<GraphXML><graph>");
    }

    fn log_url(&mut self, obj: &UrlObject) {
        let _ = writeln!(
            self.out,
            "<node name=\"{}\"><label>{}</label></node>",
            escape(&obj.url),
            obj.valid,
        );
        if let Some(parent) = &obj.parent_url {
            let _ = writeln!(
                self.out,
                "<edge source=\"{}\" target=\"{}\"/>",
                escape(parent),
                escape(&obj.url),
            );
        }
    }

    fn end(&mut self, _stats: &RunStats) {
        let _ = writeln!(self.out, "</graph></GraphXML>");
        let _ = self.out.flush();
    }
}
