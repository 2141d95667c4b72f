use crate::table::lookup;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const DATA: &str = include_str!("../data/file_builtins.json");

#[derive(Debug, Clone, Deserialize)]
pub struct FileBuiltin {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub description: String,
}

fn table() -> &'static HashMap<String, FileBuiltin> {
    static TABLE: OnceLock<HashMap<String, FileBuiltin>> = OnceLock::new();
    TABLE.get_or_init(|| serde_json::from_str(DATA).expect("file_builtins.json is valid"))
}

/// Look up a file builtin by phrase, direct then containment.
pub fn lookup_file_builtin(phrase: &str) -> Option<&'static FileBuiltin> {
    lookup(table(), phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_builtin_resolves() {
        let hit = lookup_file_builtin("test files").unwrap();
        assert!(hit.include.contains(&"*.test.*".to_string()));
        assert!(hit.exclude.contains(&"coverage/**".to_string()));
    }

    #[test]
    fn phrase_containing_builtin_key_also_resolves() {
        assert!(lookup_file_builtin("protect all environment files").is_some());
    }

    #[test]
    fn table_parses_without_panicking() {
        assert!(!table().is_empty());
    }
}
