//! `-o gml`: Graph Modelling Language crawl graph — one `node` per checked
//! URL, one `edge` per parent/child link. Thinner sibling (§10); per §1
//! Non-goals a failed fetch contributes a node but never an outgoing edge
//! ("producing a crawl graph for pages it did not successfully fetch" is
//! about the page's *own* children, not about it appearing as a target).

use std::collections::HashMap;
use std::io::Write;

use super::{Logger, RunStats};
use crate::urlobj::UrlObject;

pub(crate) struct GmlLogger {
    out: Box<dyn Write + Send>,
    ids: HashMap<String, u32>,
    next_id: u32,
    edges: Vec<(u32, u32)>,
    nodes: Vec<(u32, String, bool)>,
}

impl GmlLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        GmlLogger {
            out,
            ids: HashMap::new(),
            next_id: 0,
            edges: Vec::new(),
            nodes: Vec::new(),
        }
    }

    fn id_for(&mut self, url: &str) -> u32 {
        if let Some(id) = self.ids.get(url) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(url.to_string(), id);
        id
    }
}

impl Logger for GmlLogger {
    fn log_url(&mut self, obj: &UrlObject) {
        let target = self.id_for(&obj.url);
        self.nodes.push((target, obj.url.clone(), obj.valid));
        if let Some(parent) = &obj.parent_url {
            let source = self.id_for(parent);
            self.edges.push((source, target));
        }
    }

    fn end(&mut self, _stats: &RunStats) {
        let _ = writeln!(self.out, "graph [\n  directed 1");
        for (id, url, valid) in &self.nodes {
            let _ = writeln!(
                self.out,
                "  node [\n    id {id}\n    label \"{}\"\n    valid {}\n  ]",
                url.replace('"', "'"),
                valid,
            );
        }
        for (source, target) in &self.edges {
            let _ = writeln!(self.out, "  edge [\n    source {source}\n    target {target}\n  ]");
        }
        let _ = writeln!(self.out, "]");
        let _ = self.out.flush();
    }
}
