//! `-o csv` logger: one row per URL, RFC 4180 quoting. Ported from
//! `examples/original_source/linkcheck/logger/csvlog.py`'s column order.

use std::io::Write;

use super::Logger;
use crate::urlobj::UrlObject;

pub(crate) struct CsvLogger {
    out: Box<dyn Write + Send>,
    header_written: bool,
}

impl CsvLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        CsvLogger { out, header_written: false }
    }
}

fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl Logger for CsvLogger {
    fn log_url(&mut self, obj: &UrlObject) {
        if !self.header_written {
            let _ = writeln!(self.out, "urlname,parentname,valid,result,warningstring");
            self.header_written = true;
        }

        let warnings = obj
            .warnings
            .iter()
            .map(|(_, msg)| msg.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        let _ = writeln!(
            self.out,
            "{},{},{},{},{}",
            quote(&obj.url),
            quote(obj.parent_url.as_deref().unwrap_or("")),
            obj.valid,
            quote(&obj.result),
            quote(&warnings),
        );
    }

    fn end(&mut self, _stats: &super::RunStats) {
        let _ = self.out.flush();
    }
}
