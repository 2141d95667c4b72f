//! Daemon wire framing — newline-delimited JSON over a loopback TCP connection.
//!
//! Wire format:
//!
//!   Client → Daemon: {"action":"delete","target":"src/a.ts"} \n
//!                 or {"command":"rm -rf /"} \n
//!   Daemon → Client: {"allowed":true} \n
//!                 or {"allowed":false,"reason":"...","suggest":"..."} \n
//!
//! Any line that fails to parse as a CheckRequest produces an allow response —
//! the daemon tolerates stray noise rather than wedging the connection.

use crate::types::{CheckRequest, CheckResponse};

/// Parse one newline-terminated (terminator already stripped) request line.
/// Returns `None` on malformed JSON; the caller maps that to an allow response.
pub fn parse_request_line(line: &str) -> Option<CheckRequest> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Serialise a response as the single line (with trailing `\n`) the wire format expects.
pub fn encode_response_line(response: &CheckResponse) -> String {
    let mut line = serde_json::to_string(response).unwrap_or_else(|_| r#"{"allowed":true}"#.into());
    line.push('\n');
    line
}

/// Client-side counterpart: a shim serialises its own `CheckRequest` this way.
pub fn encode_request_line(request: &CheckRequest) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    Ok(line)
}

/// Client-side counterpart: a shim parses the daemon's response line this way.
/// Unlike `parse_request_line`, a malformed line is the shim's problem to
/// fail closed on, not something to default-allow.
pub fn parse_response_line(line: &str) -> serde_json::Result<CheckResponse> {
    serde_json::from_str(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;

    #[test]
    fn malformed_json_parses_to_none() {
        assert!(parse_request_line("not json").is_none());
        assert!(parse_request_line("").is_none());
    }

    #[test]
    fn file_request_round_trips() {
        let req = parse_request_line(r#"{"action":"read","target":"a.rs"}"#).unwrap();
        match req {
            CheckRequest::File { action, target } => {
                assert_eq!(action, Action::Read);
                assert_eq!(target, "a.rs");
            }
            _ => panic!("expected File variant"),
        }
    }

    #[test]
    fn command_request_round_trips() {
        let req = parse_request_line(r#"{"command":"npm install"}"#).unwrap();
        match req {
            CheckRequest::Command { command } => assert_eq!(command, "npm install"),
            _ => panic!("expected Command variant"),
        }
    }

    #[test]
    fn encoded_response_ends_with_newline() {
        let line = encode_response_line(&CheckResponse::allow());
        assert!(line.ends_with('\n'));
        assert_eq!(line.trim(), r#"{"allowed":true}"#);
    }

    #[test]
    fn encoded_deny_includes_reason_and_suggest() {
        let resp = CheckResponse::deny("protected file", Some("use trash instead".into()));
        let line = encode_response_line(&resp);
        assert!(line.contains("\"reason\":\"protected file\""));
        assert!(line.contains("\"suggest\":\"use trash instead\""));
    }

    #[test]
    fn request_line_round_trips_through_client_and_daemon_sides() {
        let request = CheckRequest::File {
            action: Action::Delete,
            target: "a.ts".into(),
        };
        let encoded = encode_request_line(&request).unwrap();
        let parsed = parse_request_line(&encoded).unwrap();
        match parsed {
            CheckRequest::File { action, target } => {
                assert_eq!(action, Action::Delete);
                assert_eq!(target, "a.ts");
            }
            _ => panic!("expected File variant"),
        }
    }

    #[test]
    fn response_line_parses_on_client_side() {
        let resp = CheckResponse::deny("nope", None);
        let line = encode_response_line(&resp);
        assert_eq!(parse_response_line(&line).unwrap(), resp);
    }
}
