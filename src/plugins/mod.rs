//! Content plugins (C12, `spec.md` §4.4/§9), ported from
//! `examples/original_source/linkcheck/plugins/__init__.py`'s
//! `_ContentPlugin` hook. Dispatched by name rather than `dyn` trait
//! objects, the same style `checkers::classify` uses for schemes.

pub(crate) mod anchorcheck;

/// Which optional content plugins a run has enabled (`-o`/config
/// `[plugins]`, §6). Only `AnchorCheck` exists today; the list shape
/// leaves room for more without changing callers.
pub(crate) struct PluginRegistry {
    pub(crate) anchor_check: bool,
}

impl PluginRegistry {
    pub(crate) fn enabled(names: &[String]) -> Self {
        PluginRegistry {
            anchor_check: names.iter().any(|n| n.eq_ignore_ascii_case("AnchorCheck")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_check_enabled_by_name() {
        let reg = PluginRegistry::enabled(&["AnchorCheck".to_string()]);
        assert!(reg.anchor_check);
        let reg = PluginRegistry::enabled(&[]);
        assert!(!reg.anchor_check);
    }
}
