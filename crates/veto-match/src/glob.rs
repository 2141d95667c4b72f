//! Path glob matching with platform normalisation.
//!
//! Grounded on the teacher's `operator/src/policy.rs::glob_match` — a hand-rolled
//! glob-to-regex translator — generalised with the path normalisation and
//! basename-fallback matching this spec's Pattern Matcher calls for.

use regex::Regex;

/// Normalise a path the way the matcher expects to see it: backslashes become
/// forward slashes, `.` segments are dropped, `..` collapses the preceding
/// segment, and a trailing slash is removed unless the whole path is root.
pub fn normalize_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in slashed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if slashed.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Basename (final path segment) of an already-normalised path.
fn basename(normalized: &str) -> &str {
    normalized.rsplit('/').next().unwrap_or(normalized)
}

/// Translate a glob pattern into an anchored, case-insensitive regex.
///
/// `*` matches a run of non-`/` characters, `**` matches any number of path
/// segments (including zero), `?` matches a single character, no brace
/// expansion. Dotfiles are matched by `*` (no special leading-dot exclusion).
fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let mut out = String::from("(?i)^");
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    // `**` — consume any further consecutive stars too.
                    while i < chars.len() && chars[i] == '*' {
                        i += 1;
                    }
                    out.push_str(".*");
                    continue;
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '.' | '^' | '$' | '+' | '{' | '}' | '[' | ']' | '|' | '(' | ')' | '\\' => {
                out.push('\\');
                out.push(chars[i]);
            }
            c => out.push(c),
        }
        i += 1;
    }
    out.push('$');
    Regex::new(&out).ok()
}

/// True if `target` matches `pattern`, checked against both the full
/// normalised path and its basename (so `*.test.ts` matches `src/a.test.ts`).
pub fn glob_match(pattern: &str, target: &str) -> bool {
    let normalized = normalize_path(target);
    let Some(re) = glob_to_regex(pattern) else {
        return false;
    };
    re.is_match(&normalized) || re.is_match(basename(&normalized))
}

/// A target is protected iff it matches at least one `include` glob and no
/// `exclude` glob — exclude always wins over include.
pub fn is_protected(target: &str, include: &[String], exclude: &[String]) -> bool {
    let included = include.iter().any(|p| glob_match(p, target));
    if !included {
        return false;
    }
    !exclude.iter().any(|p| glob_match(p, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_backslashes() {
        assert_eq!(normalize_path("src\\a.ts"), normalize_path("src/a.ts"));
    }

    #[test]
    fn drops_dot_segments() {
        assert_eq!(normalize_path("src/./a.ts"), "src/a.ts");
    }

    #[test]
    fn collapses_dotdot_segments() {
        assert_eq!(normalize_path("src/foo/../a.ts"), "src/a.ts");
    }

    #[test]
    fn strips_trailing_slash_except_root() {
        assert_eq!(normalize_path("src/dir/"), "src/dir");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn star_matches_basename() {
        assert!(glob_match("*.test.ts", "src/auth.test.ts"));
    }

    #[test]
    fn double_star_matches_any_depth() {
        assert!(glob_match("__tests__/**", "__tests__/a/b/c.ts"));
        assert!(glob_match("__tests__/**", "__tests__/c.ts"));
    }

    #[test]
    fn single_star_does_not_cross_segments_in_full_path_match() {
        assert!(!glob_match("src/*/file.ts", "src/a/b/file.ts"));
        assert!(glob_match("src/*/file.ts", "src/a/file.ts"));
    }

    #[test]
    fn case_insensitive() {
        assert!(glob_match("*.TEST.TS", "src/a.test.ts"));
    }

    #[test]
    fn matcher_symmetry_across_separators() {
        let include = vec!["*.test.ts".to_string()];
        let exclude = vec![];
        assert_eq!(
            is_protected("src\\a.test.ts", &include, &exclude),
            is_protected("src/a.test.ts", &include, &exclude)
        );
    }

    #[test]
    fn exclude_wins_over_include() {
        let include = vec!["*.test.*".to_string()];
        let exclude = vec!["test-results.*".to_string()];
        assert!(!is_protected("test-results.xml", &include, &exclude));
        assert!(is_protected("a.test.ts", &include, &exclude));
    }

    #[test]
    fn dotfiles_matched_by_star() {
        assert!(glob_match("*", ".env"));
        assert!(glob_match("*.env", ".env"));
    }
}
