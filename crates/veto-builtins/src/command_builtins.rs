use crate::table::lookup;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const DATA: &str = include_str!("../data/command_builtins.json");

#[derive(Debug, Clone, Deserialize)]
pub struct CommandBuiltin {
    pub block: Vec<String>,
    pub reason: String,
    #[serde(default)]
    pub suggest: Option<String>,
}

fn table() -> &'static HashMap<String, CommandBuiltin> {
    static TABLE: OnceLock<HashMap<String, CommandBuiltin>> = OnceLock::new();
    TABLE.get_or_init(|| serde_json::from_str(DATA).expect("command_builtins.json is valid"))
}

pub fn lookup_command_builtin(phrase: &str) -> Option<&'static CommandBuiltin> {
    lookup(table(), phrase)
}
