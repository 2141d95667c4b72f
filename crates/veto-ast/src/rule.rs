//! Query execution against a parsed tree, and the hybrid (AST + regex)
//! content-check contract the daemon drives.
//!
//! Grounded on `ast_rule.rs`'s `execute_with_tree`: compile the query fresh,
//! find the `@violation` capture (or the first capture), map tree-sitter's
//! 0-indexed position to 1-indexed line/column.

use crate::engine::AstEngine;
use crate::lang::{detect_language, LangTag};
use tree_sitter::{Query, QueryCursor, QueryMatch, QueryPredicate, QueryPredicateArg};
use veto_core::{AstRule, ContentMatch, ParseTiming, Policy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMethod {
    Ast,
    Regex,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct HybridCheck {
    pub allowed: bool,
    pub method: CheckMethod,
    pub matched: Option<ContentMatch>,
    pub timing: Option<ParseTiming>,
}

fn lang_name_matches(rule: &AstRule, lang: LangTag) -> bool {
    rule.languages.iter().any(|l| l == lang.as_str())
}

/// Text of the capture referenced by `idx` within `m`, if any.
fn capture_text<'a>(m: &QueryMatch, idx: u32, content: &'a str) -> Option<&'a str> {
    m.captures.iter().find(|c| c.index == idx).map(|c| &content[c.node.byte_range()])
}

/// `QueryCursor::matches` does not filter on tree-sitter's textual
/// predicates (`#eq?`, `#not-eq?`, `#match?`, `#not-match?`) — the Rust
/// binding leaves that to the caller. Evaluate each predicate attached to
/// `m`'s pattern against the actual captured text so a query like
/// `(#eq? @o "console")` rejects a structurally identical `logger.log(...)`
/// call instead of matching it.
fn predicate_satisfied(predicate: &QueryPredicate, m: &QueryMatch, content: &str) -> bool {
    let arg_text = |arg: &QueryPredicateArg| -> Option<String> {
        match arg {
            QueryPredicateArg::Capture(idx) => capture_text(m, *idx, content).map(str::to_string),
            QueryPredicateArg::String(s) => Some(s.to_string()),
        }
    };

    match predicate.operator.as_ref() {
        "eq?" | "not-eq?" => {
            let [lhs, rhs] = predicate.args.as_slice() else { return true };
            let Some(lhs) = arg_text(lhs) else { return true };
            let Some(rhs) = arg_text(rhs) else { return true };
            let equal = lhs == rhs;
            if predicate.operator.as_ref() == "eq?" { equal } else { !equal }
        }
        "match?" | "not-match?" => {
            let [capture_arg, pattern_arg] = predicate.args.as_slice() else { return true };
            let QueryPredicateArg::Capture(idx) = capture_arg else { return true };
            let Some(text) = capture_text(m, *idx, content) else { return true };
            let QueryPredicateArg::String(pattern) = pattern_arg else { return true };
            let matched = regex::Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(true);
            if predicate.operator.as_ref() == "match?" { matched } else { !matched }
        }
        // Unknown predicates don't gate the match — they're not part of
        // the builtin/compiled query vocabulary this engine targets.
        _ => true,
    }
}

/// Run a single `AstRule` against already-parsed `tree`/`content`, returning
/// the first capture (preferring one named `@violation`) from the first
/// match whose `#eq?`/`#match?` predicates all hold, as a `ContentMatch`.
fn run_rule(
    rule: &AstRule,
    tree: &tree_sitter::Tree,
    content: &str,
    file_path: &str,
    lang: LangTag,
) -> Option<ContentMatch> {
    let language = crate::grammar::GrammarRegistry::builtin().get(lang).ok()?;
    let query = Query::new(&language, &rule.query).ok()?;

    let violation_idx = query
        .capture_names()
        .iter()
        .position(|name| *name == "violation")
        .unwrap_or(0);

    let mut cursor = QueryCursor::new();
    let matches = cursor.matches(&query, tree.root_node(), content.as_bytes());

    for m in matches {
        let predicates = query.general_predicates(m.pattern_index);
        if !predicates.iter().all(|p| predicate_satisfied(p, &m, content)) {
            continue;
        }

        let Some(capture) = m
            .captures
            .iter()
            .find(|c| c.index as usize == violation_idx)
            .or_else(|| m.captures.first())
        else {
            continue;
        };

        let node = capture.node;
        let start = node.start_position();
        return Some(ContentMatch {
            file: file_path.to_string(),
            line: start.row + 1,
            column: start.column + 1,
            matched_text: content[node.byte_range()].to_string(),
            rule_reason: rule.reason.clone(),
        });
    }
    None
}

/// The hybrid check: for each AST rule in declared order, gate on the regex
/// pre-filter and the detected language before ever parsing; parse lazily
/// and only once per call. If no AST rule applies at all, fall back to the
/// plain regex content scanner so a policy mixing AST and regex rules still
/// gets full coverage from a single call.
pub fn check_content_ast(
    engine: &AstEngine,
    content: &str,
    file_path: &str,
    policy: &Policy,
) -> HybridCheck {
    let Some(lang) = detect_language(file_path) else {
        return fallback_to_regex(content, file_path, policy);
    };

    let Some(ast_rules) = policy.ast_rules.as_ref() else {
        return fallback_to_regex(content, file_path, policy);
    };

    let mut parsed: Option<(tree_sitter::Tree, ParseTiming)> = None;
    let mut any_applicable = false;

    for rule in ast_rules {
        if !rule.regex_pre_filter.is_empty() && !content.contains(&rule.regex_pre_filter) {
            continue;
        }
        if !lang_name_matches(rule, lang) {
            continue;
        }
        any_applicable = true;

        if parsed.is_none() {
            match engine.parse(file_path, lang, content) {
                Ok(p) => parsed = Some(p),
                Err(_) => {
                    tracing::warn!(lang = lang.as_str(), "AST grammar unavailable, skipping rule");
                    continue;
                }
            }
        }
        let Some((tree, timing)) = parsed.as_ref() else {
            continue;
        };

        if let Some(matched) = run_rule(rule, tree, content, file_path, lang) {
            return HybridCheck {
                allowed: false,
                method: CheckMethod::Ast,
                matched: Some(matched),
                timing: Some(*timing),
            };
        }
    }

    if any_applicable {
        return HybridCheck {
            allowed: true,
            method: CheckMethod::Ast,
            matched: None,
            timing: parsed.map(|(_, t)| t),
        };
    }

    fallback_to_regex(content, file_path, policy)
}

fn fallback_to_regex(content: &str, file_path: &str, policy: &Policy) -> HybridCheck {
    match veto_scan::check(content, file_path, policy) {
        Some(matched) => HybridCheck {
            allowed: false,
            method: CheckMethod::Regex,
            matched: Some(matched),
            timing: None,
        },
        None if policy.content_rules.is_some() => HybridCheck {
            allowed: true,
            method: CheckMethod::Regex,
            matched: None,
            timing: None,
        },
        None => HybridCheck {
            allowed: true,
            method: CheckMethod::Skipped,
            matched: None,
            timing: None,
        },
    }
}
