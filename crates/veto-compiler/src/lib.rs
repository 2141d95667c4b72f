//! veto-compiler — the compiler cascade (§4.6): verb extraction, the two
//! builtin passes, the on-disk compile cache, and the LLM tier behind the
//! `LlmProvider` seam.

pub mod anthropic;
pub mod cache;
pub mod cascade;
pub mod fixture;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use cache::{cache_key, CompileCache};
pub use cascade::{extract_action, strip_filler, Compiler};
pub use fixture::FixtureProvider;
pub use provider::{CompileRequest, LlmError, LlmProvider, LlmResult};
