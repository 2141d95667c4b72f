//! The closed set of languages the AST engine recognises, keyed off file
//! extension. An unrecognised extension means "skip AST evaluation", not an
//! error.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LangTag {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
    Python,
    Go,
    Rust,
    Java,
    Kotlin,
    C,
    Cpp,
    Ruby,
    Php,
    Bash,
}

impl LangTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LangTag::TypeScript => "typescript",
            LangTag::Tsx => "tsx",
            LangTag::JavaScript => "javascript",
            LangTag::Jsx => "jsx",
            LangTag::Python => "python",
            LangTag::Go => "go",
            LangTag::Rust => "rust",
            LangTag::Java => "java",
            LangTag::Kotlin => "kotlin",
            LangTag::C => "c",
            LangTag::Cpp => "cpp",
            LangTag::Ruby => "ruby",
            LangTag::Php => "php",
            LangTag::Bash => "bash",
        }
    }
}

/// Detect a `LangTag` from a file path's extension. Returns `None` for any
/// extension outside the closed set.
pub fn detect_language(file_path: &str) -> Option<LangTag> {
    let ext = file_path.rsplit('.').next()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "ts" | "mts" | "cts" => LangTag::TypeScript,
        "tsx" => LangTag::Tsx,
        "js" | "mjs" | "cjs" => LangTag::JavaScript,
        "jsx" => LangTag::Jsx,
        "py" | "pyw" | "pyi" => LangTag::Python,
        "go" => LangTag::Go,
        "rs" => LangTag::Rust,
        "java" => LangTag::Java,
        "kt" | "kts" => LangTag::Kotlin,
        "c" | "h" => LangTag::C,
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => LangTag::Cpp,
        "rb" => LangTag::Ruby,
        "php" => LangTag::Php,
        "sh" | "bash" => LangTag::Bash,
        _ => return None,
    })
}
