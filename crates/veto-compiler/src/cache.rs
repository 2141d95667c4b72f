//! The on-disk Compile Cache (§4.7): one JSON object mapping a 16-hex-char
//! SHA-256 prefix to a schema-tagged Policy. Writes are best-effort; reads
//! return `None` on any error, including a schema-version mismatch.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use veto_core::Policy;

/// Derive the cache key: first 16 hex chars of `SHA-256(lowercase(trim(input)))`.
pub fn cache_key(input: &str) -> String {
    let normalized = input.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let hex = format!("{digest:x}");
    hex[..16].to_string()
}

pub struct CompileCache {
    path: PathBuf,
}

impl CompileCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_table(&self) -> serde_json::Map<String, serde_json::Value> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// `None` on any failure: missing file, malformed JSON, missing key, or a
    /// `schema_version` that does not match the current one — a mismatch is
    /// a cache miss, never a crash or a stale-shape deserialisation attempt.
    pub fn get(&self, key: &str) -> Option<Policy> {
        let table = self.read_table();
        let entry = table.get(key)?;
        let policy: Policy = serde_json::from_value(entry.clone()).ok()?;
        if policy.is_current_schema() {
            Some(policy)
        } else {
            None
        }
    }

    /// Best-effort write: any I/O failure along the way is swallowed, since a
    /// cache write is never load-bearing for correctness.
    pub fn put(&self, key: &str, policy: &Policy) {
        let mut table = self.read_table();
        let Ok(value) = serde_json::to_value(policy) else {
            return;
        };
        table.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(serialized) = serde_json::to_string_pretty(&table) {
            let _ = std::fs::write(&self.path, serialized);
        }
    }

    /// Remove the whole cache file — the only invalidation path exposed to
    /// the CLI (`veto cache clear`).
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
