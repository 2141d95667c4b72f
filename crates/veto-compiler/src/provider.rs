//! The `LlmProvider` seam: one non-streaming structured-output call, so the
//! cascade's LLM tier has a single method to mock in tests and swap behind
//! `--offline`.

use serde_json::Value;
use veto_core::Action;

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("missing API key")]
    MissingApiKey,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl LlmError {
    /// Whether a retry is worth attempting — rate limits and transient
    /// upstream unavailability, never an auth or shape failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. } | LlmError::ServiceUnavailable(_))
    }
}

/// One structured-compile request: the system prompt, the raw restriction,
/// and the action the cascade's verb extraction already settled on (passed
/// through so the model does not have to re-derive it).
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub system_prompt: String,
    pub restriction: String,
    pub suggested_action: Action,
}

/// A provider compiles a restriction into a JSON value shaped like the
/// Policy schema (§4.6's LLM contract). Validation against the schema
/// happens in the cascade, not here — a provider's only job is to produce
/// the raw structured value.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    async fn compile_structured(&self, request: CompileRequest) -> LlmResult<Value>;
}
