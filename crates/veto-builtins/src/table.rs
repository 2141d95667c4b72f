//! Generic direct-then-containment lookup shared by the three builtin tables.

use crate::normalize::normalize_phrase;
use std::collections::HashMap;

pub fn lookup<'a, T>(table: &'a HashMap<String, T>, phrase: &str) -> Option<&'a T> {
    let normalized = normalize_phrase(phrase);
    if let Some(v) = table.get(&normalized) {
        return Some(v);
    }
    table
        .iter()
        .find(|(key, _)| normalized.contains(key.as_str()) || key.as_str().contains(normalized.as_str()))
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_hit_wins_over_containment() {
        let mut table = HashMap::new();
        table.insert("test files".to_string(), 1);
        table.insert("files".to_string(), 2);
        assert_eq!(lookup(&table, "test files"), Some(&1));
    }

    #[test]
    fn containment_fallback_either_direction() {
        let mut table = HashMap::new();
        table.insert("test files".to_string(), 1);
        assert_eq!(lookup(&table, "protect all test files please"), Some(&1));

        let mut table2 = HashMap::new();
        table2.insert("no console.log statements in production code".to_string(), 2);
        assert_eq!(lookup(&table2, "no console.log"), Some(&2));
    }

    #[test]
    fn no_match_returns_none() {
        let table: HashMap<String, i32> = HashMap::new();
        assert_eq!(lookup(&table, "anything"), None);
    }
}
