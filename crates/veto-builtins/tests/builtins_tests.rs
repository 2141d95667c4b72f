use veto_builtins::{lookup_ast_builtin, lookup_command_builtin, lookup_file_builtin};

#[test]
fn file_builtin_lookup_covers_named_examples() {
    assert!(lookup_file_builtin("test files").is_some());
    assert!(lookup_file_builtin("config files").is_some());
    assert!(lookup_file_builtin("environment files").is_some());
}

#[test]
fn command_builtin_lookup_covers_named_examples() {
    let hit = lookup_command_builtin("prefer pnpm").unwrap();
    assert!(hit.block.iter().any(|p| p.contains("npm i")));
}

#[test]
fn ast_builtin_lookup_covers_named_examples() {
    assert!(lookup_ast_builtin("no any types").is_some());
    // "class components" is a library keyword, not a direct phrase key —
    // resolves via the keyword table to the same canonical rule.
    let via_keyword = lookup_ast_builtin("no class components").unwrap();
    let direct = lookup_ast_builtin("no react class components").unwrap();
    assert_eq!(via_keyword.id, direct.id);
}

#[test]
fn unknown_phrase_returns_none_across_all_tables() {
    assert!(lookup_file_builtin("completely unknown phrase xyz").is_none());
    assert!(lookup_command_builtin("completely unknown phrase xyz").is_none());
    assert!(lookup_ast_builtin("completely unknown phrase xyz").is_none());
}
