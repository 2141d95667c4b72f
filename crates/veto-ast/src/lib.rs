//! veto-ast — the AST Engine (§4.4): tree-sitter-backed code-pattern
//! matching, gated by a regex pre-filter so non-matching files pay zero
//! parse cost, falling back to the plain regex scanner when no AST rule in
//! a policy applies.

mod cache;
mod engine;
mod grammar;
mod lang;
mod rule;

pub use cache::fnv1a;
pub use engine::AstEngine;
pub use grammar::{GrammarError, GrammarRegistry};
pub use lang::{detect_language, LangTag};
pub use rule::{check_content_ast, CheckMethod, HybridCheck};
