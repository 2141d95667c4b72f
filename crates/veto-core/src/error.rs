//! Error kinds shared across the veto crates.

use thiserror::Error;

/// The core error type. Each variant maps to one of the error kinds in the
/// enforcement design: missing configuration, compile failure, transient
/// remote failure, invalid input, and grammar-missing are all distinguishable
/// so callers (the CLI, the daemon) can branch on kind rather than message text.
#[derive(Error, Debug)]
pub enum Error {
    /// No API key available when the compiler cascade reaches the LLM tier.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// The LLM returned a response that doesn't validate against the Policy schema.
    #[error("compile failed: {reason} (raw: {snippet})")]
    CompileFailure { reason: String, snippet: String },

    /// Rate-limited or service-unavailable, exhausted the retry budget.
    #[error("transient remote failure after {retries} retries: {message}")]
    TransientRemote { retries: u32, message: String },

    /// Empty restriction, malformed command, etc. — a caller mistake, never cached.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A tree-sitter grammar for a recognised language is not compiled into this build.
    #[error("AST grammar unavailable for {lang}")]
    GrammarMissing { lang: String },

    /// A regex supplied by a policy (user- or LLM-authored) failed to compile.
    #[error("invalid regex `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn compile_failure(reason: impl Into<String>, raw: &str) -> Self {
        let snippet: String = raw.chars().take(200).collect();
        Self::CompileFailure {
            reason: reason.into(),
            snippet,
        }
    }

    /// Stable CLI exit code: 0 reserved for success, 1 generic, 2 validation.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) => 2,
            _ => 1,
        }
    }
}
