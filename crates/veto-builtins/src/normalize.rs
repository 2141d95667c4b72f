//! Phrase normalisation shared by all three builtin tables.

/// Lower-case, trimmed, whitespace-collapsed.
pub fn normalize_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

const NEGATION_PREFIXES: &[&str] = &[
    "don't ",
    "do not ",
    "avoid ",
    "ban ",
    "block ",
    "disallow ",
    "never use ",
];

/// Rewrite a negation prefix (`"don't"`, `"avoid"`, …) to `"no "`, used only
/// by the AST builtin table — file and command builtins are looked up
/// without this rewrite.
pub fn rewrite_negation_prefix(phrase: &str) -> String {
    let normalized = normalize_phrase(phrase);
    for prefix in NEGATION_PREFIXES {
        if let Some(rest) = normalized.strip_prefix(prefix) {
            return format!("no {rest}");
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_lowercases() {
        assert_eq!(normalize_phrase("  No   LODASH  "), "no lodash");
    }

    #[test]
    fn rewrites_common_negation_prefixes() {
        assert_eq!(rewrite_negation_prefix("don't use lodash"), "no use lodash");
        assert_eq!(rewrite_negation_prefix("avoid lodash"), "no lodash");
        assert_eq!(rewrite_negation_prefix("never use eval"), "no eval");
        assert_eq!(rewrite_negation_prefix("no lodash"), "no lodash");
    }
}
