//! `-o sql`: one `INSERT` statement per checked `UrlObject`, quoting
//! values the same way `csv`'s `quote` escapes embedded delimiters (§10
//! thinner sibling). No database driver is linked — this emits statements
//! for the operator to pipe into whatever client they use, matching the
//! original's `sql.py` "print ready-made SQL" behaviour rather than
//! connecting directly.

use std::io::Write;

use super::{Logger, RunStats};
use crate::urlobj::UrlObject;

pub(crate) struct SqlLogger {
    out: Box<dyn Write + Send>,
}

impl SqlLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        SqlLogger { out }
    }
}

fn sql_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl Logger for SqlLogger {
    fn start(&mut self, _seeds: &[String]) {
        let _ = writeln!(
            self.out,
            "-- linkchecker result dump, table `linksdb(urlname, parentname, valid, result)`"
        );
    }

    fn log_url(&mut self, obj: &UrlObject) {
        let _ = writeln!(
            self.out,
            "INSERT INTO linksdb (urlname, parentname, valid, result) VALUES ({}, {}, {}, {});",
            sql_quote(&obj.url),
            sql_quote(obj.parent_url.as_deref().unwrap_or("")),
            obj.valid,
            sql_quote(&obj.result),
        );
    }

    fn end(&mut self, _stats: &RunStats) {
        let _ = self.out.flush();
    }
}
