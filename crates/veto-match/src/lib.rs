//! veto-match — the Pattern Matcher (§4.1) and Command Parser (§4.2): glob
//! matching over file paths, and composite shell-command splitting and
//! matching, used by the compiler cascade, the daemon, and the shims alike.

pub mod command;
pub mod glob;

pub use command::{
    command_matches, expand_aliases, extract_file_targets, looks_obfuscated, split_commands,
};
pub use glob::{glob_match, is_protected, normalize_path};
