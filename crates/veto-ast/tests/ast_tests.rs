use veto_ast::{check_content_ast, AstEngine, CheckMethod};
use veto_core::{Action, AstRule, Policy};

fn policy(ast_rules: Vec<AstRule>) -> Policy {
    Policy {
        schema_version: veto_core::SCHEMA_VERSION,
        action: Action::Modify,
        include: vec![],
        exclude: vec![],
        description: "no unwrap".into(),
        command_rules: None,
        content_rules: None,
        ast_rules: Some(ast_rules),
    }
}

#[test]
fn rust_unwrap_rule_blocks_matching_file_allows_clean_one() {
    let engine = AstEngine::new();
    let rule = AstRule {
        id: "no-unwrap".into(),
        query: r#"(call_expression function: (field_expression field: (field_identifier) @method (#eq? @method "unwrap"))) @violation"#.into(),
        languages: vec!["rust".into()],
        reason: "no .unwrap() calls".into(),
        suggest: Some("propagate the error with ?".into()),
        regex_pre_filter: "unwrap".into(),
    };
    let p = policy(vec![rule]);

    let risky = check_content_ast(&engine, "let v = maybe().unwrap();", "src/a.rs", &p);
    assert!(!risky.allowed);
    assert_eq!(risky.method, CheckMethod::Ast);

    let clean = check_content_ast(&engine, "let v = maybe()?;", "src/b.rs", &p);
    assert!(clean.allowed);
}

#[test]
fn engine_reuses_cache_across_repeated_calls_on_same_content() {
    let engine = AstEngine::new();
    let rule = AstRule {
        id: "no-unwrap".into(),
        query: "(call_expression) @violation".into(),
        languages: vec!["rust".into()],
        reason: "no unwrap".into(),
        suggest: None,
        regex_pre_filter: "unwrap".into(),
    };
    let p = policy(vec![rule]);
    let content = "let v = maybe().unwrap();";

    let _ = check_content_ast(&engine, content, "src/a.rs", &p);
    assert_eq!(engine.cache_len(), 1);
    let _ = check_content_ast(&engine, content, "src/a.rs", &p);
    assert_eq!(engine.cache_len(), 1);
}
