//! veto-scan — the Content Scanner (§4.3): regex content checks with
//! mode-controlled preprocessing, exception windows, and the curated pattern
//! library backing the content-shaped builtins.

pub mod patterns;
mod strip;

use globset::{Glob, GlobSetBuilder};
use veto_core::{ContentMatch, Policy, ScanMode};

const EXCEPTION_CONTEXT_BYTES: usize = 100;

/// Nearest valid `&str` char boundary at or before `byte`.
fn floor_char_boundary(s: &str, byte: usize) -> usize {
    let mut b = byte.min(s.len());
    while b > 0 && !s.is_char_boundary(b) {
        b -= 1;
    }
    b
}

/// Nearest valid `&str` char boundary at or after `byte`.
fn ceil_char_boundary(s: &str, byte: usize) -> usize {
    let mut b = byte.min(s.len());
    while b < s.len() && !s.is_char_boundary(b) {
        b += 1;
    }
    b
}

fn line_and_column(content: &str, byte_offset: usize) -> (usize, usize) {
    let before = &content[..byte_offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => byte_offset - nl,
        None => byte_offset + 1,
    };
    (line, column)
}

/// `fileTypes` gating via `globset`, the same crate `tools/glob.rs` uses —
/// a rule with no `fileTypes` applies everywhere, otherwise any one glob
/// matching the path is enough.
fn applies_to_file(file_types: &[String], file_path: &str) -> bool {
    if file_types.is_empty() {
        return true;
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in file_types {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().map(|set| set.is_match(file_path)).unwrap_or(false)
}

/// Scan `content` (from `file_path`) against every content rule in `policy`,
/// in declared order, returning the first surviving match.
pub fn check(content: &str, file_path: &str, policy: &Policy) -> Option<ContentMatch> {
    let rules = policy.content_rules.as_ref()?;

    for rule in rules {
        if !applies_to_file(&rule.file_types, file_path) {
            continue;
        }
        let Ok(pattern) = rule.compiled_pattern() else {
            continue;
        };
        let Ok(exceptions) = rule.compiled_exceptions() else {
            continue;
        };

        let scanned = match rule.mode {
            ScanMode::Fast => content.to_string(),
            ScanMode::Strict => strip::strip_for_scan(content),
        };

        for m in pattern.find_iter(&scanned) {
            let window_start = floor_char_boundary(content, m.start().saturating_sub(EXCEPTION_CONTEXT_BYTES));
            let window_end = ceil_char_boundary(content, m.end() + EXCEPTION_CONTEXT_BYTES);
            let window = &content[window_start..window_end];

            if exceptions.iter().any(|ex| ex.is_match(window)) {
                continue;
            }

            let (line, column) = line_and_column(content, m.start());
            return Some(ContentMatch {
                file: file_path.to_string(),
                line,
                column,
                matched_text: m.as_str().to_string(),
                rule_reason: rule.reason.clone(),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use veto_core::{Action, ContentRule};

    fn policy_with_rule(rule: ContentRule) -> Policy {
        Policy {
            schema_version: veto_core::SCHEMA_VERSION,
            action: Action::Modify,
            include: vec![],
            exclude: vec![],
            description: "test policy".into(),
            command_rules: None,
            content_rules: Some(vec![rule]),
            ast_rules: None,
        }
    }

    fn rule(pattern: &str, mode: ScanMode) -> ContentRule {
        ContentRule {
            pattern: pattern.to_string(),
            file_types: vec![],
            reason: "matched".to_string(),
            suggest: None,
            mode,
            exceptions: vec![],
        }
    }

    #[test]
    fn fast_mode_matches_raw_content_including_comments() {
        let policy = policy_with_rule(rule(r"eval\(", ScanMode::Fast));
        let content = "// eval(x) is dangerous\nfoo();";
        let hit = check(content, "a.js", &policy).unwrap();
        assert_eq!(hit.line, 1);
    }

    #[test]
    fn strict_mode_skips_matches_inside_comments() {
        let policy = policy_with_rule(rule(r"eval\(", ScanMode::Strict));
        let content = "// eval(x) is dangerous\nreal_code();";
        assert!(check(content, "a.js", &policy).is_none());
    }

    #[test]
    fn strict_mode_still_matches_code_after_comment_on_later_line() {
        let policy = policy_with_rule(rule(r"eval\(", ScanMode::Strict));
        let content = "// safe comment\neval(userInput);";
        let hit = check(content, "a.js", &policy).unwrap();
        assert_eq!(hit.line, 2);
    }

    #[test]
    fn file_type_gate_skips_non_matching_extension() {
        let mut r = rule(r"eval\(", ScanMode::Fast);
        r.file_types = vec!["*.py".to_string()];
        let policy = policy_with_rule(r);
        assert!(check("eval(x)", "a.js", &policy).is_none());
    }

    #[test]
    fn exception_in_context_window_suppresses_match() {
        let mut r = rule(r"eval\(", ScanMode::Fast);
        r.exceptions = vec![r"// scanner-ignore".to_string()];
        let policy = policy_with_rule(r);
        let content = "eval(x); // scanner-ignore";
        assert!(check(content, "a.js", &policy).is_none());
    }

    #[test]
    fn line_and_column_reported_against_original_content() {
        let policy = policy_with_rule(rule(r"TODO", ScanMode::Fast));
        let content = "one\ntwo\nthree TODO here";
        let hit = check(content, "a.js", &policy).unwrap();
        assert_eq!(hit.line, 3);
        assert_eq!(hit.column, 7);
    }

    #[test]
    fn no_content_rules_returns_none() {
        let policy = Policy {
            schema_version: veto_core::SCHEMA_VERSION,
            action: Action::Modify,
            include: vec![],
            exclude: vec![],
            description: "no rules".into(),
            command_rules: None,
            content_rules: None,
            ast_rules: None,
        };
        assert!(check("eval(x)", "a.js", &policy).is_none());
    }
}
