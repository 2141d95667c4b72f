use veto_match::{command_matches, expand_aliases, extract_file_targets, is_protected, split_commands};

#[test]
fn protects_test_files_but_not_fixtures() {
    let include = vec!["**/*.test.ts".to_string(), "**/*.spec.ts".to_string()];
    let exclude = vec!["**/__fixtures__/**".to_string()];

    assert!(is_protected("src/auth/login.test.ts", &include, &exclude));
    assert!(is_protected(
        "src\\auth\\login.test.ts",
        &include,
        &exclude
    ));
    assert!(!is_protected(
        "src/auth/__fixtures__/login.test.ts",
        &include,
        &exclude
    ));
    assert!(!is_protected("src/auth/login.ts", &include, &exclude));
}

#[test]
fn composite_command_split_then_matched_against_a_rule() {
    let commands = split_commands("npm test && rm -rf node_modules || echo done");
    assert_eq!(commands.len(), 3);
    assert!(command_matches(&commands[1], "rm -rf*"));
    assert!(!command_matches(&commands[0], "rm -rf*"));
}

#[test]
fn alias_variation_feeds_into_matching() {
    let command = "npm i left-pad";
    let matched = expand_aliases(command)
        .iter()
        .any(|variant| command_matches(variant, "npm install*"));
    assert!(matched);
}

#[test]
fn subshell_wrapper_exposes_inner_targets() {
    let commands = split_commands(r#"bash -c "rm -rf src/secrets.ts""#);
    let inner = &commands[1];
    let targets = extract_file_targets(inner, "delete");
    assert_eq!(targets, vec!["src/secrets.ts"]);
}
