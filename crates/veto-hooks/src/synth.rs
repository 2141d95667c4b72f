//! Policy → hook-config synthesis (§4.10). Purely functional: a `Policy` in,
//! a `serde_json::Value` shaped for the target agent out. No I/O here —
//! writing the result to `.claude/settings.json` or wherever is the caller's
//! job.

use serde_json::{json, Value};
use veto_core::{Action, Policy};

use crate::agent::HookAgent;

struct Entry {
    pattern: String,
    reason: Option<String>,
}

/// The representative destructive command/path combinations named for a
/// delete-class policy; other action classes fall back to a generic
/// `verb:pattern` deny entry, matching the `action:path` shape already used
/// for filesystem rules across this corpus's sub-policy format.
fn destructive_patterns(action: Action, glob: &str) -> Vec<String> {
    match action {
        Action::Delete => vec![
            format!("rm {glob}"),
            format!("rm -f {glob}"),
            format!("rm -rf {glob}"),
            format!("git rm {glob}"),
        ],
        other => vec![format!("{other}:{glob}")],
    }
}

pub fn synthesise_hooks(policy: &Policy, agent: HookAgent) -> Value {
    let mut deny = Vec::new();
    let mut allow = Vec::new();

    if let Some(rules) = &policy.command_rules {
        for rule in rules {
            for pattern in &rule.block {
                deny.push(Entry {
                    pattern: agent.rewrite_glob(pattern),
                    reason: Some(rule.reason.clone()),
                });
            }
        }
    }

    for pattern in &policy.include {
        for combo in destructive_patterns(policy.action, pattern) {
            deny.push(Entry {
                pattern: agent.rewrite_glob(&combo),
                reason: Some(policy.description.clone()),
            });
        }
    }

    for pattern in &policy.exclude {
        allow.push(agent.rewrite_glob(pattern));
    }

    render(agent, deny, allow)
}

fn render(agent: HookAgent, deny: Vec<Entry>, allow: Vec<String>) -> Value {
    match agent {
        HookAgent::ClaudeCode => json!({
            "permissions": {
                "allow": allow,
                "deny": deny.iter().map(|e| e.pattern.clone()).collect::<Vec<_>>(),
            }
        }),
        HookAgent::OpenCodeAider => {
            let mut rules: Vec<Value> = deny
                .into_iter()
                .map(|e| {
                    json!({
                        "pattern": e.pattern,
                        "decision": "deny",
                        "reason": e.reason,
                    })
                })
                .collect();
            rules.extend(allow.into_iter().map(|pattern| {
                json!({
                    "pattern": pattern,
                    "decision": "allow",
                    "reason": Value::Null,
                })
            }));
            json!({ "rules": rules })
        }
    }
}
