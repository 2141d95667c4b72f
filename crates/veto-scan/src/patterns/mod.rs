//! Curated named pattern sets, each a regex alternation wide enough to catch
//! every common equivalent form (ES import styles, CommonJS, dynamic import,
//! destructuring/aliasing) behind a single restriction label.
//!
//! These back the Builtin Tables' AST/content builtins — a named set here is
//! what `"no lodash"` or `"no console.log"` ultimately compiles down to when
//! the pattern is regex-shaped rather than tree-sitter-shaped.

/// One named, ready-to-compile pattern set.
pub struct PatternSet {
    pub name: &'static str,
    pub pattern: &'static str,
    pub file_types: &'static [&'static str],
    pub reason: &'static str,
}

pub const LODASH: PatternSet = PatternSet {
    name: "lodash",
    pattern: r#"(?x)
        \b import \s+ .*? \s+ from \s+ ['"]lodash(?:/\S+)?['"]
      | \b require\( \s* ['"]lodash(?:/\S+)?['"] \s* \)
      | \b import\( \s* ['"]lodash(?:/\S+)?['"] \s* \)
    "#,
    file_types: &["*.ts", "*.tsx", "*.js", "*.jsx", "*.mjs", "*.cjs"],
    reason: "lodash import detected",
};

pub const ANY_TYPE: PatternSet = PatternSet {
    name: "any-type",
    pattern: r#"(?x)
        : \s* any \b
      | \bas\s+any\b
      | <\s*any\s*>
      | Array<any>
      | any\[\]
    "#,
    file_types: &["*.ts", "*.tsx", "*.mts", "*.cts"],
    reason: "`any` type annotation detected",
};

pub const CONSOLE: PatternSet = PatternSet {
    name: "console",
    pattern: r#"\bconsole\s*\.\s*(?:log|debug|info|warn|error|trace|table|dir)\s*\("#,
    file_types: &["*.ts", "*.tsx", "*.js", "*.jsx", "*.mjs", "*.cjs"],
    reason: "console method call detected",
};

pub const REACT_CLASS_COMPONENT: PatternSet = PatternSet {
    name: "react-class-component",
    pattern: r#"\bclass\s+\w+\s+extends\s+(?:React\.)?(?:Component|PureComponent)\b"#,
    file_types: &["*.tsx", "*.jsx", "*.ts", "*.js"],
    reason: "React class component detected",
};

pub const EVAL: PatternSet = PatternSet {
    name: "eval",
    pattern: r#"\beval\s*\(|\bnew\s+Function\s*\("#,
    file_types: &["*.ts", "*.tsx", "*.js", "*.jsx", "*.mjs", "*.cjs"],
    reason: "eval / dynamic code execution detected",
};

pub const MOMENT: PatternSet = PatternSet {
    name: "moment",
    pattern: r#"(?x)
        \bimport\s+.*?\s+from\s+['"]moment(?:/\S+)?['"]
      | \brequire\(\s*['"]moment(?:/\S+)?['"]\s*\)
    "#,
    file_types: &["*.ts", "*.tsx", "*.js", "*.jsx", "*.mjs", "*.cjs"],
    reason: "moment import detected — prefer date-fns or the platform Intl/Temporal APIs",
};

pub const INNER_HTML: PatternSet = PatternSet {
    name: "innerHTML",
    pattern: r#"\.innerHTML\s*=|\.outerHTML\s*=|dangerouslySetInnerHTML"#,
    file_types: &["*.ts", "*.tsx", "*.js", "*.jsx"],
    reason: "unsanitised HTML injection sink detected",
};

pub const DEBUGGER: PatternSet = PatternSet {
    name: "debugger",
    pattern: r#"\bdebugger\s*;?"#,
    file_types: &["*.ts", "*.tsx", "*.js", "*.jsx", "*.mjs", "*.cjs"],
    reason: "debugger statement detected",
};

pub const ALL: &[&PatternSet] = &[
    &LODASH,
    &ANY_TYPE,
    &CONSOLE,
    &REACT_CLASS_COMPONENT,
    &EVAL,
    &MOMENT,
    &INNER_HTML,
    &DEBUGGER,
];

/// Look up a named set by its key (as used in the builtin phrase tables).
pub fn by_name(name: &str) -> Option<&'static PatternSet> {
    ALL.iter().find(|set| set.name == name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn every_pattern_compiles() {
        for set in ALL {
            Regex::new(set.pattern).unwrap_or_else(|e| panic!("{} failed to compile: {e}", set.name));
        }
    }

    #[test]
    fn lodash_matches_common_import_forms() {
        let re = Regex::new(LODASH.pattern).unwrap();
        assert!(re.is_match(r#"import _ from "lodash";"#));
        assert!(re.is_match(r#"import { debounce } from 'lodash/debounce';"#));
        assert!(re.is_match(r#"const _ = require("lodash");"#));
        assert!(!re.is_match(r#"import { debounce } from "./debounce";"#));
    }

    #[test]
    fn console_matches_every_common_method() {
        let re = Regex::new(CONSOLE.pattern).unwrap();
        for method in ["log", "warn", "error", "debug"] {
            assert!(re.is_match(&format!("console.{method}('x')")));
        }
    }

    #[test]
    fn by_name_lookup() {
        assert!(by_name("eval").is_some());
        assert!(by_name("nonexistent").is_none());
    }
}
