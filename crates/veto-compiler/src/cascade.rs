//! Action extraction, filler stripping, and the four-stage cascade itself
//! (§4.6): builtin lookup on the stripped phrase, builtin lookup on the raw
//! restriction, compile-cache lookup, then the LLM tier.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use veto_core::{Action, AstRule, CommandRule, ContentRule, Error, Policy, ScanMode};

use crate::cache::{cache_key, CompileCache};
use crate::provider::{CompileRequest, LlmError, LlmProvider};

const SYSTEM_PROMPT: &str = "You compile a single natural-language coding restriction into a \
    structured Policy. Prefer AST rules over regex content rules for code patterns — they have \
    zero false positives. Call emit_policy exactly once with the full Policy shape.";

const MAX_RETRIES: u32 = 4;
const BASE_BACKOFF_MS: u64 = 4000;
const MAX_JITTER_MS: u64 = 1000;

const COMMAND_PREFERENCE_KEYWORDS: &[&str] = &[
    "npm", "yarn", "pnpm", "git", "sudo", "install", "push", "force", "bash", "sh ", "eval",
    "curl", "wget", "docker", "chmod", "chown", "rm -rf",
];

struct VerbPattern {
    regex: &'static str,
    action: Action,
}

fn verb_patterns() -> &'static [VerbPattern] {
    static PATTERNS: OnceLock<Vec<VerbPattern>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                VerbPattern { regex: r"^(?:delete|remove|rm)\b[:\s]*", action: Action::Delete },
                VerbPattern {
                    regex: r"^(?:modify|edit|change|update|write|touch)\b[:\s]*",
                    action: Action::Modify,
                },
                VerbPattern {
                    regex: r"^(?:run|execute|executing)\b[:\s]*",
                    action: Action::Execute,
                },
                VerbPattern { regex: r"^(?:read|view|access)\b[:\s]*", action: Action::Read },
                VerbPattern {
                    regex: r"^(?:protect|preserve|keep|save)\b[:\s]*",
                    action: Action::Modify,
                },
                VerbPattern { regex: r"^(?:prefer|use)\b[:\s]*", action: Action::Execute },
            ]
        })
        .as_slice()
}

fn classify_as_command_preference(lower: &str) -> bool {
    COMMAND_PREFERENCE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Drop leading `any/all/the` and a trailing `files?/directories?/folders?`
/// — applied only to file-intent target phrases, never to execute-intent ones.
pub fn strip_filler(phrase: &str) -> String {
    let mut s = phrase.trim().to_string();
    for prefix in ["any ", "all ", "the "] {
        if let Some(rest) = s.to_lowercase().strip_prefix(prefix) {
            s = s[s.len() - rest.len()..].to_string();
        }
    }
    let trailing = Regex::new(r"(?i)\s+(?:files?|directories?|folders?)\s*$").unwrap();
    s = trailing.replace(&s, "").to_string();
    s.trim().to_string()
}

/// Inspect the leading verb and return the classified action plus the
/// target phrase with that verb stripped off.
pub fn extract_action(restriction: &str) -> (Action, String) {
    let trimmed = restriction.trim();
    let lower = trimmed.to_lowercase();

    for pattern in verb_patterns() {
        let re = Regex::new(pattern.regex).unwrap();
        if let Some(m) = re.find(&lower) {
            let target = trimmed[m.end()..].trim().to_string();
            let target = if pattern.action == Action::Execute {
                target
            } else {
                strip_filler(&target)
            };
            return (pattern.action, target);
        }
    }

    let no_running = Regex::new(r"^no\s+(?:running|executing)\b[:\s]*").unwrap();
    if let Some(m) = no_running.find(&lower) {
        return (Action::Execute, trimmed[m.end()..].trim().to_string());
    }

    let no_prefix = Regex::new(r"^no\b[:\s]*").unwrap();
    if let Some(m) = no_prefix.find(&lower) {
        let rest = trimmed[m.end()..].trim().to_string();
        return if classify_as_command_preference(&lower) {
            (Action::Execute, rest)
        } else {
            (Action::Modify, strip_filler(&rest))
        };
    }

    (Action::Modify, strip_filler(trimmed))
}

fn policy_from_ast_builtin(action: Action, description: String, ast: &veto_builtins::AstBuiltin) -> Policy {
    Policy {
        schema_version: veto_core::SCHEMA_VERSION,
        action,
        include: vec![],
        exclude: vec![],
        description,
        command_rules: None,
        content_rules: None,
        ast_rules: Some(vec![AstRule {
            id: ast.id.clone(),
            query: ast.query.clone(),
            languages: ast.languages.clone(),
            reason: ast.reason.clone(),
            suggest: ast.suggest.clone(),
            regex_pre_filter: ast.regex_pre_filter.clone(),
        }]),
    }
}

fn policy_from_command_builtin(
    action: Action,
    description: String,
    cmd: &veto_builtins::CommandBuiltin,
) -> Policy {
    Policy {
        schema_version: veto_core::SCHEMA_VERSION,
        action,
        include: vec![],
        exclude: vec![],
        description,
        command_rules: Some(vec![CommandRule {
            block: cmd.block.clone(),
            reason: cmd.reason.clone(),
            suggest: cmd.suggest.clone(),
        }]),
        content_rules: None,
        ast_rules: None,
    }
}

fn policy_from_file_builtin(action: Action, file: &veto_builtins::FileBuiltin) -> Policy {
    Policy {
        schema_version: veto_core::SCHEMA_VERSION,
        action,
        include: file.include.clone(),
        exclude: file.exclude.clone(),
        description: file.description.clone(),
        command_rules: None,
        content_rules: None,
        ast_rules: None,
    }
}

fn policy_from_content_builtin(
    action: Action,
    description: String,
    content: &veto_builtins::ContentBuiltin,
) -> Policy {
    let set = content.pattern_set();
    Policy {
        schema_version: veto_core::SCHEMA_VERSION,
        action,
        include: vec![],
        exclude: vec![],
        description,
        command_rules: None,
        content_rules: Some(vec![ContentRule {
            pattern: set.pattern.to_string(),
            file_types: set.file_types.iter().map(|s| s.to_string()).collect(),
            reason: set.reason.to_string(),
            suggest: content.suggest.clone(),
            mode: ScanMode::default(),
            exceptions: vec![],
        }]),
        ast_rules: None,
    }
}

/// Try all four builtin tables against `phrase`: AST first (it is the
/// highest-precision tier, zero false positives by construction), then the
/// curated content pattern-set library for restrictions no AST query covers
/// (e.g. "no moment", "no innerHTML") before falling through to the
/// action-appropriate table.
fn try_builtins(action: Action, phrase: &str, original: &str) -> Option<Policy> {
    if let Some(ast) = veto_builtins::lookup_ast_builtin(phrase) {
        return Some(policy_from_ast_builtin(action, original.to_string(), ast));
    }
    if action != Action::Execute {
        if let Some(content) = veto_builtins::lookup_content_builtin(phrase) {
            return Some(policy_from_content_builtin(action, original.to_string(), content));
        }
    }
    if action == Action::Execute {
        if let Some(cmd) = veto_builtins::lookup_command_builtin(phrase) {
            return Some(policy_from_command_builtin(action, original.to_string(), cmd));
        }
    } else if let Some(file) = veto_builtins::lookup_file_builtin(phrase) {
        return Some(policy_from_file_builtin(action, file));
    }
    None
}

fn policy_from_llm_value(action: Action, original: &str, value: Value) -> Result<Policy, Error> {
    let raw = value.to_string();

    let parsed_action = value
        .get("action")
        .and_then(Value::as_str)
        .map(|s| s.parse::<Action>())
        .transpose()
        .map_err(|_| Error::compile_failure("invalid action field", &raw))?
        .unwrap_or(action);

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| original.to_string());

    let include = string_array(&value, "include");
    let exclude = string_array(&value, "exclude");

    let command_rules = value.get("commandRules").and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|entry| {
                Some(CommandRule {
                    block: string_array(entry, "block"),
                    reason: entry.get("reason")?.as_str()?.to_string(),
                    suggest: entry.get("suggest").and_then(Value::as_str).map(str::to_string),
                })
            })
            .collect::<Vec<_>>()
    });

    let content_rules = value.get("contentRules").and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|entry| {
                Some(ContentRule {
                    pattern: entry.get("pattern")?.as_str()?.to_string(),
                    file_types: string_array(entry, "fileTypes"),
                    reason: entry.get("reason")?.as_str()?.to_string(),
                    suggest: entry.get("suggest").and_then(Value::as_str).map(str::to_string),
                    mode: ScanMode::default(),
                    exceptions: vec![],
                })
            })
            .collect::<Vec<_>>()
    });

    let ast_rules = value.get("astRules").and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|entry| {
                Some(AstRule {
                    id: entry.get("id")?.as_str()?.to_string(),
                    query: entry.get("query")?.as_str()?.to_string(),
                    languages: string_array(entry, "languages"),
                    reason: entry.get("reason")?.as_str()?.to_string(),
                    suggest: entry.get("suggest").and_then(Value::as_str).map(str::to_string),
                    regex_pre_filter: entry
                        .get("regexPreFilter")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
            })
            .collect::<Vec<_>>()
    });

    let policy = Policy {
        schema_version: veto_core::SCHEMA_VERSION,
        action: parsed_action,
        include,
        exclude,
        description,
        command_rules,
        content_rules,
        ast_rules,
    };

    policy
        .validate()
        .map_err(|_| Error::compile_failure("missing required Policy field", &raw))?;
    Ok(policy)
}

fn string_array(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

fn jitter_ms() -> u64 {
    rand::random::<u64>() % MAX_JITTER_MS
}

async fn compile_via_llm(
    provider: &dyn LlmProvider,
    restriction: &str,
    action: Action,
) -> Result<Value, Error> {
    let mut attempt = 0u32;
    loop {
        let request = CompileRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            restriction: restriction.to_string(),
            suggested_action: action,
        };
        match provider.compile_structured(request).await {
            Ok(value) => return Ok(value),
            Err(LlmError::MissingApiKey) => {
                return Err(Error::MissingConfig("no Anthropic API key configured".into()))
            }
            Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                let backoff = BASE_BACKOFF_MS * 2u64.pow(attempt);
                tokio::time::sleep(Duration::from_millis(backoff + jitter_ms())).await;
                attempt += 1;
            }
            Err(e) if attempt < MAX_RETRIES => {
                return Err(Error::CompileFailure {
                    reason: e.to_string(),
                    snippet: restriction.chars().take(200).collect(),
                });
            }
            Err(e) => {
                return Err(Error::TransientRemote {
                    retries: attempt,
                    message: e.to_string(),
                })
            }
        }
    }
}

/// The compiler cascade itself.
pub struct Compiler<P: LlmProvider> {
    provider: P,
    cache: CompileCache,
}

impl<P: LlmProvider> Compiler<P> {
    pub fn new(provider: P, cache: CompileCache) -> Self {
        Self { provider, cache }
    }

    pub async fn compile(&self, restriction: &str) -> Result<Policy, Error> {
        let trimmed = restriction.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_input("restriction must not be empty"));
        }

        let (action, stripped) = extract_action(trimmed);

        if let Some(policy) = try_builtins(action, &stripped, trimmed) {
            return Ok(policy);
        }
        let normalized_original = trimmed.to_lowercase();
        if let Some(policy) = try_builtins(action, &normalized_original, trimmed) {
            return Ok(policy);
        }

        let key = cache_key(trimmed);
        if let Some(policy) = self.cache.get(&key) {
            return Ok(policy);
        }

        let value = compile_via_llm(&self.provider, trimmed, action).await?;
        let policy = policy_from_llm_value(action, trimmed, value)?;
        self.cache.put(&key, &policy);
        Ok(policy)
    }
}
