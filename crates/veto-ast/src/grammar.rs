//! Static grammar registry: `LangTag -> tree_sitter::Language`. Grammars are
//! linked in at compile time behind a feature per language — there is no
//! dynamic `.so`/`.wasm` loading, since the crates that provide grammars to
//! this ecosystem are themselves statically-linked C sources.

use crate::lang::LangTag;
use std::collections::HashMap;
use std::sync::OnceLock;
use tree_sitter::Language;

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar for `{0}` is not compiled into this build")]
    Unavailable(&'static str),
}

/// The closed set of grammars wired to their compiled-in crates. Missing a
/// feature for a language means `GrammarRegistry::get` returns
/// `GrammarError::Unavailable` for it — never a panic.
pub struct GrammarRegistry {
    languages: HashMap<LangTag, Language>,
}

impl GrammarRegistry {
    fn build() -> Self {
        let mut languages = HashMap::new();

        #[cfg(feature = "lang-rust")]
        languages.insert(LangTag::Rust, tree_sitter_rust::LANGUAGE.into());

        #[cfg(feature = "lang-typescript")]
        {
            languages.insert(
                LangTag::TypeScript,
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            );
            languages.insert(LangTag::Tsx, tree_sitter_typescript::LANGUAGE_TSX.into());
        }

        #[cfg(feature = "lang-javascript")]
        {
            languages.insert(LangTag::JavaScript, tree_sitter_javascript::LANGUAGE.into());
            languages.insert(LangTag::Jsx, tree_sitter_javascript::LANGUAGE.into());
        }

        #[cfg(feature = "lang-python")]
        languages.insert(LangTag::Python, tree_sitter_python::LANGUAGE.into());

        #[cfg(feature = "lang-go")]
        languages.insert(LangTag::Go, tree_sitter_go::LANGUAGE.into());

        #[cfg(feature = "lang-java")]
        languages.insert(LangTag::Java, tree_sitter_java::LANGUAGE.into());

        #[cfg(feature = "lang-kotlin")]
        languages.insert(LangTag::Kotlin, tree_sitter_kotlin_ng::LANGUAGE.into());

        #[cfg(feature = "lang-c")]
        languages.insert(LangTag::C, tree_sitter_c::LANGUAGE.into());

        #[cfg(feature = "lang-cpp")]
        languages.insert(LangTag::Cpp, tree_sitter_cpp::LANGUAGE.into());

        #[cfg(feature = "lang-ruby")]
        languages.insert(LangTag::Ruby, tree_sitter_ruby::LANGUAGE.into());

        #[cfg(feature = "lang-php")]
        languages.insert(LangTag::Php, tree_sitter_php::LANGUAGE_PHP.into());

        #[cfg(feature = "lang-bash")]
        languages.insert(LangTag::Bash, tree_sitter_bash::LANGUAGE.into());

        GrammarRegistry { languages }
    }

    /// The process-wide registry of every grammar compiled into this build.
    pub fn builtin() -> &'static GrammarRegistry {
        static REGISTRY: OnceLock<GrammarRegistry> = OnceLock::new();
        REGISTRY.get_or_init(GrammarRegistry::build)
    }

    pub fn get(&self, lang: LangTag) -> Result<Language, GrammarError> {
        self.languages
            .get(&lang)
            .cloned()
            .ok_or(GrammarError::Unavailable(lang.as_str()))
    }

    pub fn is_available(&self, lang: LangTag) -> bool {
        self.languages.contains_key(&lang)
    }
}
