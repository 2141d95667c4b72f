use serde_json::json;
use veto_compiler::{CompileCache, Compiler, FixtureProvider};
use veto_core::Action;

fn compiler_with_cache() -> (Compiler<FixtureProvider>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let cache = CompileCache::new(dir.path().join("cache.json"));
    (Compiler::new(FixtureProvider::new(), cache), dir)
}

#[tokio::test]
async fn builtin_hit_never_touches_provider_or_cache() {
    let (compiler, _dir) = compiler_with_cache();
    let policy = compiler.compile("no lodash").await.unwrap();
    assert_eq!(policy.action, Action::Modify);
    assert!(policy.ast_rules.is_some());
}

#[tokio::test]
async fn file_builtin_hit_resolves_test_files() {
    let (compiler, _dir) = compiler_with_cache();
    let policy = compiler.compile("delete any test files").await.unwrap();
    assert_eq!(policy.action, Action::Delete);
    assert!(policy.include.contains(&"*.test.*".to_string()));
}

#[tokio::test]
async fn llm_fallback_is_used_and_then_cached() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let provider = FixtureProvider::new().with_fixture(
        "protect src/payments from modification",
        json!({
            "action": "modify",
            "include": ["src/payments/**"],
            "description": "protect payments module",
        }),
    );
    let compiler = Compiler::new(provider, CompileCache::new(cache_path.clone()));

    let policy = compiler
        .compile("protect src/payments from modification")
        .await
        .unwrap();
    assert_eq!(policy.action, Action::Modify);
    assert_eq!(policy.description, "protect payments module");
    assert!(cache_path.exists());

    let cache = CompileCache::new(cache_path);
    let key = veto_compiler::cache_key("protect src/payments from modification");
    assert!(cache.get(&key).is_some());
}

#[tokio::test]
async fn empty_restriction_is_invalid_input() {
    let (compiler, _dir) = compiler_with_cache();
    let err = compiler.compile("   ").await.unwrap_err();
    assert!(matches!(err, veto_core::Error::InvalidInput(_)));
}
