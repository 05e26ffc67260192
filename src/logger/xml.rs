//! `-o xml`: one `<url>` element per checked `UrlObject`, field-for-field
//! with the `csv`/`text` loggers' columns (§10 thinner sibling).

use std::io::Write;

use super::{Logger, RunStats};
use crate::urlobj::UrlObject;

pub(crate) struct XmlLogger {
    out: Box<dyn Write + Send>,
}

impl XmlLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        XmlLogger { out }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl Logger for XmlLogger {
    fn start(&mut self, _seeds: &[String]) {
        let _ = writeln!(self.out, "<?xml version=\"1.0\"?>\n<urls>");
    }

    fn log_url(&mut self, obj: &UrlObject) {
        let _ = writeln!(self.out, "  <url valid=\"{}\">", obj.valid);
        let _ = writeln!(self.out, "    <name>{}</name>", escape(&obj.url));
        if let Some(parent) = &obj.parent_url {
            let _ = writeln!(self.out, "    <parent>{}</parent>", escape(parent));
        }
        if !obj.result.is_empty() {
            let _ = writeln!(self.out, "    <result>{}</result>", escape(&obj.result));
        }
        for (tag, msg) in &obj.warnings {
            let _ = writeln!(
                self.out,
                "    <warning tag=\"{}\">{}</warning>",
                escape(tag),
                escape(msg)
            );
        }
        let _ = writeln!(self.out, "  </url>");
    }

    fn end(&mut self, _stats: &RunStats) {
        let _ = writeln!(self.out, "</urls>");
        let _ = self.out.flush();
    }
}
