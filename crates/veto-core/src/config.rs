//! Process-wide configuration — an optional TOML file plus environment overrides.
//!
//! Resolution mirrors the teacher's OpenClaw config: plain serde structs with
//! `#[serde(default)]`, no builder macro, environment variables take priority
//! over file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VetoConfig {
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub daemon: VetoDaemonConfig,
}

impl Default for VetoConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_base_url: None,
            cache_dir: None,
            daemon: VetoDaemonConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VetoDaemonConfig {
    /// Bind host — always loopback in practice, kept configurable for tests.
    pub bind_host: String,
}

impl Default for VetoDaemonConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".into(),
        }
    }
}

impl VetoConfig {
    /// Load from `path` if it exists (TOML), then apply environment overrides.
    /// Missing file is not an error — callers get pure-environment defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = path
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|content| toml::from_str::<VetoConfig>(&content).ok())
            .unwrap_or_default();

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.anthropic_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("ANTHROPIC_API_URL") {
            config.anthropic_base_url = Some(url);
        }
        if let Ok(dir) = std::env::var("VETO_CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        config
    }

    /// Resolve the compile-cache file path: `$VETO_CACHE_DIR/cache.json`, or
    /// `$XDG_CONFIG_HOME/veto/cache.json` via the `dirs` crate, falling back to
    /// `~/.config/veto/cache.json`.
    pub fn cache_file(&self) -> PathBuf {
        let dir = self.cache_dir.clone().unwrap_or_else(default_config_dir);
        dir.join("cache.json")
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("veto")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = VetoConfig::load(Some(Path::new("/nonexistent/veto.toml")));
        assert!(config.daemon.bind_host == "127.0.0.1");
    }

    #[test]
    fn env_overrides_file() {
        std::env::set_var("ANTHROPIC_API_KEY", "sk-test-env");
        let config = VetoConfig::load(None);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test-env"));
        std::env::remove_var("ANTHROPIC_API_KEY");
    }
}
