use crate::normalize::rewrite_negation_prefix;
use crate::table::lookup;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const DATA: &str = include_str!("../data/ast_builtins.json");
const KEYWORDS_DATA: &str = include_str!("../data/library_keywords.json");

#[derive(Debug, Clone, Deserialize)]
pub struct AstBuiltin {
    pub id: String,
    pub query: String,
    pub languages: Vec<String>,
    pub reason: String,
    #[serde(default)]
    pub suggest: Option<String>,
    #[serde(rename = "regexPreFilter", default)]
    pub regex_pre_filter: String,
}

fn table() -> &'static HashMap<String, AstBuiltin> {
    static TABLE: OnceLock<HashMap<String, AstBuiltin>> = OnceLock::new();
    TABLE.get_or_init(|| serde_json::from_str(DATA).expect("ast_builtins.json is valid"))
}

/// Maps bare library/keyword mentions (`lodash`, `react`, …) to the canonical
/// AST builtin key, consulted only once the phrase is known to be negated.
fn keywords() -> &'static HashMap<String, String> {
    static TABLE: OnceLock<HashMap<String, String>> = OnceLock::new();
    TABLE.get_or_init(|| serde_json::from_str(KEYWORDS_DATA).expect("library_keywords.json is valid"))
}

/// Look up an AST builtin. The phrase is first negation-normalised (`"don't
/// use lodash"` → `"no use lodash"`); a direct/containment hit on the AST
/// table wins, otherwise — only when the normalised phrase is a negation —
/// a bare keyword mention (`"lodash"`) is mapped to its canonical key.
pub fn lookup_ast_builtin(phrase: &str) -> Option<&'static AstBuiltin> {
    let negated = rewrite_negation_prefix(phrase);

    // Containment fallback (and the keyword table) only ever fire once the
    // phrase is a negation — a bare "lodash" must not resolve on its own.
    let Some(bare) = negated.strip_prefix("no ") else {
        return table().get(&negated);
    };

    if let Some(hit) = lookup(table(), &negated) {
        return Some(hit);
    }
    lookup(keywords(), bare).and_then(|canonical| table().get(canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_phrase_resolves() {
        assert!(lookup_ast_builtin("no console.log").is_some());
    }

    #[test]
    fn negation_prefix_variants_all_resolve_to_same_rule() {
        let a = lookup_ast_builtin("no lodash").unwrap();
        let b = lookup_ast_builtin("don't use lodash").unwrap();
        let c = lookup_ast_builtin("avoid lodash").unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(b.id, c.id);
    }

    #[test]
    fn bare_keyword_mention_requires_negation() {
        assert!(lookup_ast_builtin("lodash").is_none());
        assert!(lookup_ast_builtin("ban lodash").is_some());
    }

    #[test]
    fn language_prefixed_entries_resolve() {
        assert_eq!(lookup_ast_builtin("no python eval").unwrap().id, "no-python-eval");
        assert_eq!(lookup_ast_builtin("no go panic").unwrap().id, "no-go-panic");
        assert_eq!(lookup_ast_builtin("no rust unwrap").unwrap().id, "no-rust-unwrap");
    }
}
