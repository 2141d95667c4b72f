//! The per-request evaluation pipeline (§4.8). Pure: no I/O, cannot fail —
//! every request gets a defined allow-or-deny response.

use veto_core::{Action, CheckRequest, CheckResponse, Policy};
use veto_match::{command_matches, expand_aliases, is_protected, split_commands};

pub fn evaluate(request: &CheckRequest, policy: &Policy) -> CheckResponse {
    match request {
        CheckRequest::Command { command } => evaluate_command(command, policy),
        CheckRequest::File { action, target } => evaluate_file(*action, target, policy),
    }
}

fn evaluate_command(command: &str, policy: &Policy) -> CheckResponse {
    let Some(rules) = policy.command_rules.as_ref().filter(|r| !r.is_empty()) else {
        return CheckResponse::allow();
    };

    for simple in split_commands(command) {
        for variant in expand_aliases(&simple) {
            for rule in rules {
                if rule.block.iter().any(|pattern| command_matches(&variant, pattern)) {
                    return CheckResponse::deny(rule.reason.clone(), rule.suggest.clone());
                }
            }
        }
    }
    CheckResponse::allow()
}

fn evaluate_file(action: Action, target: &str, policy: &Policy) -> CheckResponse {
    if action != policy.action {
        return CheckResponse::allow();
    }
    if is_protected(target, &policy.include, &policy.exclude) {
        CheckResponse::deny(policy.description.clone(), None)
    } else {
        CheckResponse::allow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veto_core::CommandRule;

    fn file_policy() -> Policy {
        Policy {
            schema_version: veto_core::SCHEMA_VERSION,
            action: Action::Delete,
            include: vec!["*.test.*".into(), "__tests__/**".into()],
            exclude: vec!["test-results.*".into(), "**/coverage/**".into()],
            description: "test files are protected from deletion".into(),
            command_rules: None,
            content_rules: None,
            ast_rules: None,
        }
    }

    fn command_policy() -> Policy {
        Policy {
            schema_version: veto_core::SCHEMA_VERSION,
            action: Action::Execute,
            include: vec![],
            exclude: vec![],
            description: "prefer pnpm".into(),
            command_rules: Some(vec![CommandRule {
                block: vec!["npm install*".into(), "yarn*".into()],
                reason: "prefer pnpm".into(),
                suggest: Some("pnpm install".into()),
            }]),
            content_rules: None,
            ast_rules: None,
        }
    }

    #[test]
    fn file_delete_of_test_file_is_blocked() {
        let req = CheckRequest::File {
            action: Action::Delete,
            target: "src/auth.test.ts".into(),
        };
        let resp = evaluate(&req, &file_policy());
        assert!(!resp.allowed);
    }

    #[test]
    fn file_delete_of_excluded_results_is_allowed() {
        let req = CheckRequest::File {
            action: Action::Delete,
            target: "test-results.xml".into(),
        };
        let resp = evaluate(&req, &file_policy());
        assert!(resp.allowed);
    }

    #[test]
    fn action_mismatch_always_allows() {
        let req = CheckRequest::File {
            action: Action::Modify,
            target: "src/auth.test.ts".into(),
        };
        let resp = evaluate(&req, &file_policy());
        assert!(resp.allowed);
    }

    #[test]
    fn command_with_subshell_chain_blocks_on_npm_install() {
        let req = CheckRequest::Command {
            command: "cd src && npm install lodash".into(),
        };
        let resp = evaluate(&req, &command_policy());
        assert!(!resp.allowed);
        assert_eq!(resp.suggest.as_deref(), Some("pnpm install"));
    }

    #[test]
    fn command_using_preferred_tool_is_allowed() {
        let req = CheckRequest::Command {
            command: "pnpm install lodash".into(),
        };
        let resp = evaluate(&req, &command_policy());
        assert!(resp.allowed);
    }

    #[test]
    fn command_request_against_file_only_policy_allows() {
        let req = CheckRequest::Command {
            command: "rm -rf /".into(),
        };
        let resp = evaluate(&req, &file_policy());
        assert!(resp.allowed);
    }
}
