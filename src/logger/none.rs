//! `-o none`/`-q`: discard every result. Still a real `Logger` so the
//! fan-out never needs a special case for "no output" (`spec.md` §6 `-q`
//! "alias for `-o none`").

use super::Logger;
use crate::urlobj::UrlObject;

pub(crate) struct NoneLogger;

impl Logger for NoneLogger {
    fn log_url(&mut self, _obj: &UrlObject) {}
}
