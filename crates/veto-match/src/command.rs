//! Shell-command parsing and pattern matching.
//!
//! Grounded on the teacher's `operator/src/policy.rs` (`bash_candidates`,
//! `strip_env_prefix`, `detect_obfuscation`) — the closest existing
//! shell-command-variant matcher in the corpus — generalised to the
//! composite-command splitter and alias table this spec's Command Parser
//! calls for.

use regex::Regex;
use std::sync::OnceLock;

/// Split a composite shell string into the ordered list of simple commands it
/// would execute. Recognises `&&`, `||`, `;`, and unquoted `|`. Content inside
/// matched single/double quotes, and inside `(...)`/`{...}` groupings, is
/// preserved — separators at `depth > 0` or inside quotes do not split.
///
/// If a simple command matches a `(bash|sh|zsh) [-c] "…"` subshell wrapper,
/// the captured body is recursively split and appended *in addition to* the
/// wrapper command itself — per the source's documented boundary, other
/// wrapper forms (e.g. `env VAR=1 bash -c …`) are intentionally not handled.
pub fn split_commands(input: &str) -> Vec<String> {
    let mut commands = Vec::new();
    for simple in split_top_level(input) {
        let simple = simple.trim().to_string();
        if simple.is_empty() {
            continue;
        }
        if let Some(inner) = subshell_body(&simple) {
            commands.push(simple.clone());
            commands.extend(split_commands(&inner));
        } else {
            commands.push(simple);
        }
    }
    commands
}

/// Split on `&&`, `||`, `;`, and unquoted `|`, respecting quote and
/// paren/brace nesting. Returns raw (untrimmed) segments.
fn split_top_level(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut depth: i32 = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_single {
            current.push(c);
            if c == '\'' {
                in_single = false;
            }
            i += 1;
            continue;
        }
        if in_double {
            current.push(c);
            if c == '"' {
                in_double = false;
            }
            i += 1;
            continue;
        }

        match c {
            '\'' => {
                in_single = true;
                current.push(c);
                i += 1;
                continue;
            }
            '"' => {
                in_double = true;
                current.push(c);
                i += 1;
                continue;
            }
            '(' | '{' => {
                depth += 1;
                current.push(c);
                i += 1;
                continue;
            }
            ')' | '}' => {
                depth = (depth - 1).max(0);
                current.push(c);
                i += 1;
                continue;
            }
            _ => {}
        }

        if depth == 0 {
            if c == '&' && chars.get(i + 1) == Some(&'&') {
                segments.push(std::mem::take(&mut current));
                i += 2;
                continue;
            }
            if c == '|' && chars.get(i + 1) == Some(&'|') {
                segments.push(std::mem::take(&mut current));
                i += 2;
                continue;
            }
            if c == ';' {
                segments.push(std::mem::take(&mut current));
                i += 1;
                continue;
            }
            if c == '|' {
                segments.push(std::mem::take(&mut current));
                i += 1;
                continue;
            }
        }

        current.push(c);
        i += 1;
    }
    segments.push(current);
    segments
}

fn subshell_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)^(?:bash|sh|zsh)\s+(?:-c\s+)?(?:"(.*)"|'(.*)')\s*$"#).unwrap()
    })
}

/// If `command` matches `(bash|sh|zsh) [-c] "…"`/`'…'`, return the captured body.
fn subshell_body(command: &str) -> Option<String> {
    let caps = subshell_regex().captures(command)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `*` translated to `.*`, `?` to `.`, everything else literal — unlike the
/// path matcher, command text has no separator concept so `*` crosses
/// everything including spaces.
fn text_glob_match(pattern: &str, text: &str) -> bool {
    let mut out = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '.' | '^' | '$' | '+' | '{' | '}' | '[' | ']' | '|' | '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('$');
    Regex::new(&out).map(|re| re.is_match(text)).unwrap_or(false)
}

/// Match a (lower-cased, whitespace-collapsed) command against a pattern.
/// Exact equality is a fast path; a pattern with no wildcards is a prefix
/// match; any pattern carrying a `*` is glob-matched against the whole
/// command, so a trailing `*` matches arbitrary trailing arguments and a
/// mid-pattern `*` matches arbitrary text in between.
pub fn command_matches(command: &str, pattern: &str) -> bool {
    let cmd = collapse_ws(&command.to_lowercase());
    let pat = collapse_ws(&pattern.to_lowercase());

    if cmd == pat {
        return true;
    }
    if !pat.contains('*') {
        return cmd == pat || cmd.starts_with(&format!("{pat} "));
    }
    text_glob_match(&pat, &cmd)
}

/// `(alias, expansion)` table for the small closed set of common shorthand
/// invocations. Defined once, shared by every caller — not re-derived per call.
const ALIASES: &[(&str, &str)] = &[
    ("npm i", "npm install"),
    ("npm un", "npm uninstall"),
    ("npm rm", "npm uninstall"),
    ("git co", "git checkout"),
    ("git ci", "git commit"),
    ("git br", "git branch"),
    ("git rb", "git rebase"),
];

/// Expand the small closed set of common aliases. Returns the original form
/// plus, if an alias applied, the expanded form — both are matched against.
pub fn expand_aliases(command: &str) -> Vec<String> {
    let trimmed = command.trim();
    let mut variations = vec![trimmed.to_string()];

    for (alias, expansion) in ALIASES {
        if trimmed == *alias || trimmed.starts_with(&format!("{alias} ")) {
            let rest = &trimmed[alias.len()..];
            variations.push(format!("{expansion}{rest}"));
            return variations;
        }
    }

    // `yarn` bare (no subcommand, or only flags) defaults to `yarn install`.
    let first_token = trimmed.split_whitespace().next().unwrap_or("");
    if first_token == "yarn" {
        let rest = trimmed[first_token.len()..].trim_start();
        if rest.is_empty() || rest.starts_with('-') {
            let sep = if rest.is_empty() { "" } else { " " };
            variations.push(format!("yarn install{sep}{rest}"));
        }
    }

    variations
}

/// Advisory obfuscation guard — does not change a command's Policy outcome on
/// its own; callers may escalate it to a deny. Grounded on
/// `operator/src/policy.rs::detect_obfuscation`.
pub fn looks_obfuscated(command: &str) -> bool {
    let lower = command.to_lowercase();

    if lower.contains("base64")
        && (lower.contains("| bash") || lower.contains("| sh") || lower.contains("| eval"))
    {
        return true;
    }
    if lower.contains("ld_preload") || lower.contains("ld_library_path") {
        return true;
    }
    if lower.contains("/proc/self/exe") || lower.contains("/proc/self/fd") {
        return true;
    }
    if Regex::new(r"[A-Za-z_]\w*=\S+\s*;.*\$")
        .unwrap()
        .is_match(&lower)
    {
        return true;
    }
    if Regex::new(r"(?:^|\s|;)(bash|sh|dash)\s+-c\s")
        .unwrap()
        .is_match(&lower)
    {
        return true;
    }
    if Regex::new(r"(?:^|\s|;)eval\s").unwrap().is_match(&lower) {
        return true;
    }
    if Regex::new(r"(?:bash|sh|dash)\s+<<<").unwrap().is_match(&lower) {
        return true;
    }
    if Regex::new(r"(?:bash|sh|dash)\s+<<\s*\w")
        .unwrap()
        .is_match(&lower)
    {
        return true;
    }
    if lower.contains("xargs") && (lower.contains("sh") || lower.contains("bash")) {
        return true;
    }
    false
}

/// Executables whose non-flag arguments are candidate targets for `action`,
/// with a table of single-value flags that consume their adjacent argument.
/// `first_only` stops collection at the first non-flag token — `mv a b` and
/// `node script.js arg1 arg2` only ever name one file target, the rest are a
/// destination or passthrough arguments, not additional targets.
struct TargetSpec {
    executables: &'static [&'static str],
    value_flags: &'static [&'static str],
    first_only: bool,
}

fn target_spec_for(action: &str) -> Option<TargetSpec> {
    match action {
        "delete" => Some(TargetSpec {
            executables: &["rm", "unlink", "rmdir", "git rm"],
            value_flags: &[],
            first_only: false,
        }),
        "modify" => Some(TargetSpec {
            executables: &["mv", "cp"],
            value_flags: &[],
            first_only: true,
        }),
        "execute" => Some(TargetSpec {
            executables: &["node", "python", "python3", "bash", "sh"],
            value_flags: &[],
            first_only: true,
        }),
        "read" => Some(TargetSpec {
            executables: &["cat", "head", "tail", "less", "more"],
            value_flags: &["-n", "-c", "--lines", "--bytes"],
            first_only: false,
        }),
        _ => None,
    }
}

/// Extract candidate file targets for the given action class from a single
/// simple command (not a composite one — split first).
pub fn extract_file_targets(command: &str, action: &str) -> Vec<String> {
    let Some(spec) = target_spec_for(action) else {
        return Vec::new();
    };
    let tokens: Vec<&str> = command.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    for exe in spec.executables {
        let exe_tokens: Vec<&str> = exe.split_whitespace().collect();
        if tokens.len() < exe_tokens.len() {
            continue;
        }
        if tokens[..exe_tokens.len()] != exe_tokens[..] {
            continue;
        }
        let args = &tokens[exe_tokens.len()..];
        let mut targets = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i];
            if arg.starts_with('-') {
                if spec.value_flags.contains(&arg) {
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }
            targets.push(arg.to_string());
            if spec.first_only {
                break;
            }
            i += 1;
        }
        return targets;
    }
    Vec::new()
}
