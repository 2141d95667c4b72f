//! The two concrete hook-config targets (§4.10, §9.3) behind one enum, so a
//! third integration is one new match arm rather than a parallel code path.

use std::str::FromStr;
use veto_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAgent {
    /// Claude-Code-style `settings.json` permissions block.
    ClaudeCode,
    /// OpenCode/Aider-style flat rule list.
    OpenCodeAider,
}

impl HookAgent {
    /// Glob rewrite applied to every pattern before it's emitted — Claude
    /// Code keeps `**` as-is, the flat-rule-list agents collapse it to a
    /// single-segment `*`.
    pub fn rewrite_glob(&self, pattern: &str) -> String {
        match self {
            HookAgent::ClaudeCode => pattern.to_string(),
            HookAgent::OpenCodeAider => pattern.replace("**", "*"),
        }
    }
}

impl FromStr for HookAgent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "claude-code" | "claudecode" => Ok(HookAgent::ClaudeCode),
            "opencode" | "aider" | "opencode-aider" => Ok(HookAgent::OpenCodeAider),
            other => Err(Error::invalid_input(format!("unknown hook agent: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_code_keeps_double_star() {
        assert_eq!(HookAgent::ClaudeCode.rewrite_glob("**/*.test.ts"), "**/*.test.ts");
    }

    #[test]
    fn opencode_collapses_double_star() {
        assert_eq!(HookAgent::OpenCodeAider.rewrite_glob("**/*.test.ts"), "*/*.test.ts");
    }

    #[test]
    fn parses_known_aliases() {
        assert_eq!("claude-code".parse::<HookAgent>().unwrap(), HookAgent::ClaudeCode);
        assert_eq!("aider".parse::<HookAgent>().unwrap(), HookAgent::OpenCodeAider);
        assert!("unknown-agent".parse::<HookAgent>().is_err());
    }
}
