//! The Policy data model and its satellite types.
//!
//! A Policy is the single compiled, executable representation of a restriction.
//! It is produced once by the compiler cascade and never mutated afterwards —
//! a changed restriction produces a new Policy, it does not edit an old one.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::SystemTime;

/// Current Policy/cache-entry schema version. A cache entry written under a
/// different version is treated as a miss rather than deserialised blindly —
/// see the compile cache's version check.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Delete,
    Modify,
    Execute,
    Read,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Delete => "delete",
            Action::Modify => "modify",
            Action::Execute => "execute",
            Action::Read => "read",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "delete" => Ok(Action::Delete),
            "modify" => Ok(Action::Modify),
            "execute" => Ok(Action::Execute),
            "read" => Ok(Action::Read),
            other => Err(Error::invalid_input(format!("unknown action: {other}"))),
        }
    }
}

/// One shell-command-variant block rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRule {
    pub block: Vec<String>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Fast,
    Strict,
}

/// A content-scanning rule: a compiled regex plus the file-type gate it applies under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRule {
    pub pattern: String,
    #[serde(default)]
    pub file_types: Vec<String>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest: Option<String>,
    #[serde(default)]
    pub mode: ScanMode,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

impl ContentRule {
    /// Compile `pattern` so a bad regex is caught at Policy-construction time,
    /// never as a per-request surprise.
    pub fn compiled_pattern(&self) -> Result<Regex> {
        Regex::new(&self.pattern).map_err(|source| Error::InvalidRegex {
            pattern: self.pattern.clone(),
            source,
        })
    }

    pub fn compiled_exceptions(&self) -> Result<Vec<Regex>> {
        self.exceptions
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| Error::InvalidRegex {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// A tree-sitter-query-backed code rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstRule {
    pub id: String,
    pub query: String,
    pub languages: Vec<String>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest: Option<String>,
    #[serde(default)]
    pub regex_pre_filter: String,
}

/// The compiled, executable representation of a restriction.
///
/// Invariant: at least one of `include`, `command_rules`, `content_rules`, or
/// `ast_rules` is non-empty. Constructed once per restriction; never mutated —
/// callers that want a different policy build a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub action: Action,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_rules: Option<Vec<CommandRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_rules: Option<Vec<ContentRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast_rules: Option<Vec<AstRule>>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Policy {
    /// Validate the invariants from §3: non-emptiness, regex compile, well-formed globs.
    pub fn validate(&self) -> Result<()> {
        let has_content = !self.include.is_empty()
            || self.command_rules.as_ref().is_some_and(|r| !r.is_empty())
            || self.content_rules.as_ref().is_some_and(|r| !r.is_empty())
            || self.ast_rules.as_ref().is_some_and(|r| !r.is_empty());
        if !has_content {
            return Err(Error::invalid_input(
                "policy must have at least one of include/commandRules/contentRules/astRules",
            ));
        }
        if let Some(rules) = &self.content_rules {
            for rule in rules {
                rule.compiled_pattern()?;
                rule.compiled_exceptions()?;
            }
        }
        Ok(())
    }

    /// True if this policy was compiled under the schema version this build expects.
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}

/// Daemon wire request — either a file check or a command check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckRequest {
    File { action: Action, target: String },
    Command { command: String },
}

/// Daemon wire response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResponse {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest: Option<String>,
}

impl CheckResponse {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            suggest: None,
        }
    }

    pub fn deny(reason: impl Into<String>, suggest: Option<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            suggest,
        }
    }
}

/// A single blocked action retained in the bounded ring for the session summary.
#[derive(Debug, Clone, Serialize)]
pub struct BlockedAction {
    pub description: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub at: chrono::DateTime<chrono::Utc>,
}

/// In-memory, daemon-owned counters and recent-history ring.
///
/// Cap of 5 retained blocked actions, matching §3 — full history is the audit
/// sink's concern, not this struct's.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub started_at: SystemTime,
    pub allowed_count: u64,
    pub blocked_count: u64,
    recent_blocked: VecDeque<BlockedAction>,
}

const BLOCKED_RING_CAP: usize = 5;

impl SessionState {
    pub fn new() -> Self {
        Self {
            started_at: SystemTime::now(),
            allowed_count: 0,
            blocked_count: 0,
            recent_blocked: VecDeque::with_capacity(BLOCKED_RING_CAP),
        }
    }

    pub fn record_allowed(&mut self) {
        self.allowed_count += 1;
    }

    pub fn record_blocked(&mut self, description: impl Into<String>) {
        self.blocked_count += 1;
        if self.recent_blocked.len() == BLOCKED_RING_CAP {
            self.recent_blocked.pop_front();
        }
        self.recent_blocked.push_back(BlockedAction {
            description: description.into(),
            at: chrono::Utc::now(),
        });
    }

    /// A read-only snapshot for external readers (audit sink, CLI summary).
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            started_at: self.started_at,
            allowed_count: self.allowed_count,
            blocked_count: self.blocked_count,
            recent_blocked: self.recent_blocked.iter().cloned().collect(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned copy of SessionState's externally-visible fields. The daemon is the
/// only writer of SessionState; everyone else reads a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    #[serde(skip)]
    pub started_at: SystemTime,
    pub allowed_count: u64,
    pub blocked_count: u64,
    pub recent_blocked: Vec<BlockedAction>,
}

/// AST parse-tree cache entry metadata (the tree itself lives in veto-ast,
/// which depends on this crate, not the other way around).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParseTiming {
    pub parse_time_ms: f64,
}

/// A single content-scan hit, with line/column computed against the
/// *original* (unstripped) content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContentMatch {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub matched_text: String,
    pub rule_reason: String,
}
