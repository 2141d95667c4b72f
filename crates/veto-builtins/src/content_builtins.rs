use crate::table::lookup;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use veto_scan::patterns::{by_name, PatternSet};

const DATA: &str = include_str!("../data/content_builtins.json");

/// A phrase-keyed pointer into `veto_scan::patterns` rather than an inline
/// regex — the pattern bodies stay in one place so `veto-scan`'s own tests
/// are the only ones that ever exercise the regex text itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBuiltin {
    pub pattern_set: String,
    #[serde(default)]
    pub suggest: Option<String>,
}

impl ContentBuiltin {
    /// Resolve the referenced `PatternSet`. Panics on a bad table entry —
    /// `content_builtins.json` is embedded and checked by a table-parses test.
    pub fn pattern_set(&self) -> &'static PatternSet {
        by_name(&self.pattern_set)
            .unwrap_or_else(|| panic!("content_builtins.json references unknown pattern set {}", self.pattern_set))
    }
}

fn table() -> &'static HashMap<String, ContentBuiltin> {
    static TABLE: OnceLock<HashMap<String, ContentBuiltin>> = OnceLock::new();
    TABLE.get_or_init(|| serde_json::from_str(DATA).expect("content_builtins.json is valid"))
}

/// Look up a content builtin by phrase, direct then containment.
pub fn lookup_content_builtin(phrase: &str) -> Option<&'static ContentBuiltin> {
    lookup(table(), phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_moment_resolves_to_moment_pattern_set() {
        let hit = lookup_content_builtin("no moment").unwrap();
        assert_eq!(hit.pattern_set().name, "moment");
        assert!(hit.suggest.is_some());
    }

    #[test]
    fn phrase_containing_builtin_key_also_resolves() {
        assert!(lookup_content_builtin("please add no debugger statements to the policy").is_some());
    }

    #[test]
    fn every_entry_resolves_to_a_real_pattern_set() {
        for entry in table().values() {
            assert!(by_name(&entry.pattern_set).is_some(), "unknown pattern set {}", entry.pattern_set);
        }
    }
}
