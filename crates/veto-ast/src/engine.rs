//! The stateful half of the AST Engine: a parser-per-language pool plus the
//! parse cache. Deliberately `!Sync` (the `RefCell`s make it so) so that the
//! daemon must keep one engine per worker rather than share one behind a
//! lock — partitioning is enforced at the type level.

use crate::cache::ParseCache;
use crate::grammar::{GrammarError, GrammarRegistry};
use crate::lang::LangTag;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;
use tree_sitter::{Parser, Tree};
use veto_core::ParseTiming;

#[derive(Default)]
pub struct AstEngine {
    parsers: RefCell<HashMap<LangTag, Parser>>,
    cache: RefCell<ParseCache>,
}

impl AstEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_parser<T>(
        &self,
        lang: LangTag,
        f: impl FnOnce(&mut Parser) -> T,
    ) -> Result<T, GrammarError> {
        let mut parsers = self.parsers.borrow_mut();
        if !parsers.contains_key(&lang) {
            let language = GrammarRegistry::builtin().get(lang)?;
            let mut parser = Parser::new();
            parser
                .set_language(&language)
                .map_err(|_| GrammarError::Unavailable(lang.as_str()))?;
            parsers.insert(lang, parser);
        }
        let parser = parsers.get_mut(&lang).expect("just inserted");
        Ok(f(parser))
    }

    /// Parse `content` for `path`, reusing the cached tree when the content
    /// hash has not changed. Returns the tree and how long the *parse* took
    /// (zero on a cache hit).
    pub fn parse(
        &self,
        path: &str,
        lang: LangTag,
        content: &str,
    ) -> Result<(Tree, ParseTiming), GrammarError> {
        if let Some(tree) = self.cache.borrow().get(path, content.as_bytes()) {
            return Ok((tree.clone(), ParseTiming { parse_time_ms: 0.0 }));
        }

        let started = Instant::now();
        let tree = self
            .with_parser(lang, |parser| parser.parse(content, None))?
            .ok_or(GrammarError::Unavailable(lang.as_str()))?;
        let parse_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.cache
            .borrow_mut()
            .insert(path.to_string(), content.as_bytes(), tree.clone());

        Ok((tree, ParseTiming { parse_time_ms }))
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn clear_cache_entry(&self, path: &str) {
        self.cache.borrow_mut().clear_entry(path);
    }

    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reparses_on_content_change_reuses_on_repeat() {
        let engine = AstEngine::new();
        let (_, first) = engine.parse("a.rs", LangTag::Rust, "fn a() {}").unwrap();
        assert!(first.parse_time_ms >= 0.0);

        let (_, cached) = engine.parse("a.rs", LangTag::Rust, "fn a() {}").unwrap();
        assert_eq!(cached.parse_time_ms, 0.0);

        let (_, changed) = engine.parse("a.rs", LangTag::Rust, "fn b() {}").unwrap();
        assert!(changed.parse_time_ms >= 0.0);
    }
}
