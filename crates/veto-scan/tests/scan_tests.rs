use veto_core::{Action, ContentRule, Policy, ScanMode};
use veto_scan::check;

fn lodash_policy() -> Policy {
    Policy {
        schema_version: veto_core::SCHEMA_VERSION,
        action: Action::Modify,
        include: vec![],
        exclude: vec![],
        description: "no lodash".into(),
        command_rules: None,
        content_rules: Some(vec![ContentRule {
            pattern: veto_scan::patterns::LODASH.pattern.to_string(),
            file_types: veto_scan::patterns::LODASH
                .file_types
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reason: veto_scan::patterns::LODASH.reason.to_string(),
            suggest: Some("use native Array/Object methods".to_string()),
            mode: ScanMode::Fast,
            exceptions: vec![],
        }]),
        ast_rules: None,
    }
}

#[test]
fn catches_lodash_import_in_ts_file() {
    let policy = lodash_policy();
    let hit = check(
        "import { debounce } from 'lodash';\nexport const f = debounce(() => {}, 100);",
        "src/util.ts",
        &policy,
    );
    assert!(hit.is_some());
    assert_eq!(hit.unwrap().rule_reason, "lodash import detected");
}

#[test]
fn ignores_lodash_import_in_non_gated_file_type() {
    let policy = lodash_policy();
    assert!(check("import lodash", "README.md", &policy).is_none());
}

#[test]
fn strict_mode_does_not_flag_lodash_mentioned_in_a_comment() {
    let mut policy = lodash_policy();
    if let Some(rules) = policy.content_rules.as_mut() {
        rules[0].mode = ScanMode::Strict;
    }
    let content = "// we used to import lodash here\nconst add = (a, b) => a + b;";
    assert!(check(content, "src/math.ts", &policy).is_none());
}
