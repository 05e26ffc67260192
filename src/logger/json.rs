//! `-o json` logger: one JSON object per line (NDJSON), deliberately
//! following the teacher's hand-rolled escaping in the old `output.rs`
//! rather than pulling in `serde_json` for a record shape this small.

use std::io::Write;

use super::Logger;
use crate::urlobj::UrlObject;

pub(crate) struct JsonLogger {
    out: Box<dyn Write + Send>,
}

impl JsonLogger {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        JsonLogger { out }
    }
}

impl Logger for JsonLogger {
    fn log_url(&mut self, obj: &UrlObject) {
        let mut buf = Vec::new();
        let _ = write!(self.out, "{{\"url\": \"");
        escape_json(&obj.url, &mut buf);
        let _ = self.out.write_all(&buf);

        let _ = write!(self.out, "\", \"parent\": \"");
        escape_json(obj.parent_url.as_deref().unwrap_or(""), &mut buf);
        let _ = self.out.write_all(&buf);

        let _ = write!(self.out, "\", \"valid\": {}", obj.valid);

        let _ = write!(self.out, ", \"result\": \"");
        escape_json(&obj.result, &mut buf);
        let _ = self.out.write_all(&buf);

        let _ = write!(self.out, "\", \"warnings\": [");
        for (i, (tag, msg)) in obj.warnings.iter().enumerate() {
            if i > 0 {
                let _ = write!(self.out, ", ");
            }
            let _ = write!(self.out, "{{\"tag\": \"");
            escape_json(tag, &mut buf);
            let _ = self.out.write_all(&buf);
            let _ = write!(self.out, "\", \"message\": \"");
            escape_json(msg, &mut buf);
            let _ = self.out.write_all(&buf);
            let _ = write!(self.out, "\"}}");
        }
        let _ = writeln!(self.out, "]}}");
    }

    fn end(&mut self, _stats: &super::RunStats) {
        let _ = self.out.flush();
    }
}

fn escape_json(s: &str, buf: &mut Vec<u8>) {
    buf.clear();

    for byte in s.bytes() {
        match byte {
            b'"' => buf.extend_from_slice(b"\\\""),
            b'\\' => buf.extend_from_slice(b"\\\\"),
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            b'\x08' => buf.extend_from_slice(b"\\b"),
            b'\x0C' => buf.extend_from_slice(b"\\f"),
            b if b < 0x20 => {
                buf.extend_from_slice(b"\\u00");
                buf.push(b"0123456789abcdef"[(b >> 4) as usize]);
                buf.push(b"0123456789abcdef"[(b & 0x0F) as usize]);
            }
            b => buf.push(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::escape_json;

    #[test]
    fn escapes_control_and_quote_characters() {
        let mut buf = Vec::new();
        escape_json("a\"b\\c\nd\x08e", &mut buf);
        assert_eq!(buf, b"a\\\"b\\\\c\\nd\\be");
    }
}
