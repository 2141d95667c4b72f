//! Parse-tree cache keyed by absolute file path, invalidated on content hash
//! mismatch rather than by any external signal (mtime, watch events, …).

use std::collections::HashMap;
use tree_sitter::Tree;

/// 32-bit FNV-1a over the raw bytes, used purely as a cheap change detector —
/// not a security boundary, so collisions are an acceptable, rare re-parse.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c9dc5;
    const PRIME: u32 = 0x0100_0193;
    let mut hash = OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

struct CacheEntry {
    tree: Tree,
    content_hash: u32,
}

/// Per-engine parse cache. Deliberately not `Sync` (matches `AstEngine`,
/// which owns one of these per instance) — partitioning across engines is
/// enforced at the type level rather than by locking a shared map.
#[derive(Default)]
pub struct ParseCache {
    entries: HashMap<String, CacheEntry>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached tree for `path` iff its stored hash still matches
    /// `content`'s hash.
    pub fn get(&self, path: &str, content: &[u8]) -> Option<&Tree> {
        let entry = self.entries.get(path)?;
        if entry.content_hash == fnv1a(content) {
            Some(&entry.tree)
        } else {
            None
        }
    }

    pub fn insert(&mut self, path: String, content: &[u8], tree: Tree) {
        self.entries.insert(
            path,
            CacheEntry {
                tree,
                content_hash: fnv1a(content),
            },
        );
    }

    pub fn clear_entry(&mut self, path: &str) {
        self.entries.remove(path);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
