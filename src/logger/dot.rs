//! `-o dot`: Graphviz DOT crawl graph. Shares the same deferred,
//! whole-run-buffered shape as `gml` (§10 thinner sibling) since DOT's
//! node/edge declarations need every label known before the closing `}`.

use std::collections::HashSet;
use std::io::Write;

use super::{Logger, RunStats};
use crate::urlobj::UrlObject;

pub(crate) struct DotLogger {
    out: Box<dyn Write + Send>,
    edges: Vec<(String, String)>,
    nodes: HashSet<String>,
    invalid: HashSet<String>,
}

impl DotLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        DotLogger {
            out,
            edges: Vec::new(),
            nodes: HashSet::new(),
            invalid: HashSet::new(),
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Logger for DotLogger {
    fn log_url(&mut self, obj: &UrlObject) {
        self.nodes.insert(obj.url.clone());
        if !obj.valid {
            self.invalid.insert(obj.url.clone());
        }
        if let Some(parent) = &obj.parent_url {
            self.edges.push((parent.clone(), obj.url.clone()));
        }
    }

    fn end(&mut self, _stats: &RunStats) {
        let _ = writeln!(self.out, "digraph G {{");
        for node in &self.nodes {
            let color = if self.invalid.contains(node) { "red" } else { "black" };
            let _ = writeln!(self.out, "  \"{}\" [color={}];", escape(node), color);
        }
        for (from, to) in &self.edges {
            let _ = writeln!(self.out, "  \"{}\" -> \"{}\";", escape(from), escape(to));
        }
        let _ = writeln!(self.out, "}}");
        let _ = self.out.flush();
    }
}
