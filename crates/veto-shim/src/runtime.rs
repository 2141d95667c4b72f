//! The daemon-handshake and directory-walk logic behind `veto shim-check`
//! (§4.9). Lives in one place so every generated shim script delegates to
//! it instead of re-implementing socket I/O in `sh`.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;
use veto_core::{Action, CheckRequest};

const MAX_DEPTH: usize = 50;
const MAX_ENTRIES: usize = 10_000;
const DAEMON_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum ShimCheckError {
    DaemonUnreachable(std::io::Error),
    MalformedResponse,
    Denied { reason: Option<String>, suggest: Option<String> },
}

impl std::fmt::Display for ShimCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShimCheckError::DaemonUnreachable(e) => write!(f, "daemon unreachable: {e}"),
            ShimCheckError::MalformedResponse => write!(f, "daemon sent a malformed response"),
            ShimCheckError::Denied { reason, .. } => {
                write!(f, "{}", reason.as_deref().unwrap_or("denied"))
            }
        }
    }
}

/// Expand `targets` (files or directories, capped at depth/entry limits) into
/// concrete file paths, then check each against the daemon in turn. Any
/// deny, timeout, or connection failure is treated as fail-closed: the first
/// problem aborts the whole check before the real command ever runs.
pub fn check_targets(targets: &[String], action: Action, port: u16) -> Result<(), ShimCheckError> {
    for target in targets {
        let path = Path::new(target);
        if !path.exists() {
            continue;
        }
        if path.is_dir() {
            let mut entries = Vec::new();
            walk_directory(path, &mut entries);
            for entry in entries {
                check_one(&entry, action, port)?;
            }
        } else {
            check_one(target, action, port)?;
        }
    }
    Ok(())
}

/// Capped recursive walk collecting file paths under `dir`. A permission
/// error on any one entry is skipped rather than aborting the walk — the
/// `Result::ok` filter drops it the same way `std::fs::read_dir` errors were
/// dropped before.
fn walk_directory(dir: &Path, out: &mut Vec<String>) {
    for entry in walkdir::WalkDir::new(dir).max_depth(MAX_DEPTH).into_iter().filter_map(Result::ok) {
        if out.len() >= MAX_ENTRIES {
            return;
        }
        if entry.file_type().is_file() {
            if let Some(s) = entry.path().to_str() {
                out.push(s.to_string());
            }
        }
    }
}

fn check_one(target: &str, action: Action, port: u16) -> Result<(), ShimCheckError> {
    let mut stream =
        TcpStream::connect(("127.0.0.1", port)).map_err(ShimCheckError::DaemonUnreachable)?;
    stream
        .set_read_timeout(Some(DAEMON_TIMEOUT))
        .map_err(ShimCheckError::DaemonUnreachable)?;
    stream
        .set_write_timeout(Some(DAEMON_TIMEOUT))
        .map_err(ShimCheckError::DaemonUnreachable)?;

    let request = CheckRequest::File {
        action,
        target: target.to_string(),
    };
    let line = veto_core::encode_request_line(&request).map_err(|_| ShimCheckError::MalformedResponse)?;
    stream
        .write_all(line.as_bytes())
        .map_err(ShimCheckError::DaemonUnreachable)?;

    let mut reader = BufReader::new(stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(ShimCheckError::DaemonUnreachable)?;
    if response_line.is_empty() {
        return Err(ShimCheckError::DaemonUnreachable(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "daemon closed connection without a response",
        )));
    }

    let response =
        veto_core::parse_response_line(&response_line).map_err(|_| ShimCheckError::MalformedResponse)?;
    if response.allowed {
        Ok(())
    } else {
        Err(ShimCheckError::Denied {
            reason: response.reason,
            suggest: response.suggest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    fn spawn_fake_daemon(response: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 512];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        port
    }

    #[test]
    fn allow_response_is_ok() {
        let port = spawn_fake_daemon("{\"allowed\":true}\n");
        let result = check_targets(&["/nonexistent-path-for-test".into()], Action::Delete, port);
        assert!(result.is_ok());
    }

    #[test]
    fn deny_response_is_err() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.test.ts");
        std::fs::write(&file, "x").unwrap();
        let port = spawn_fake_daemon("{\"allowed\":false,\"reason\":\"nope\"}\n");
        let result = check_targets(&[file.to_str().unwrap().to_string()], Action::Delete, port);
        assert!(matches!(result, Err(ShimCheckError::Denied { .. })));
    }

    #[test]
    fn unreachable_daemon_is_err() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        std::fs::write(&file, "x").unwrap();
        let result = check_targets(&[file.to_str().unwrap().to_string()], Action::Delete, 1);
        assert!(matches!(result, Err(ShimCheckError::DaemonUnreachable(_))));
    }

    #[test]
    fn missing_target_is_skipped_without_contacting_daemon() {
        let result = check_targets(&["/definitely/does/not/exist".into()], Action::Delete, 1);
        assert!(result.is_ok());
    }

    #[test]
    fn directory_target_walks_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.ts"), "x").unwrap();
        std::fs::write(dir.path().join("nested/b.ts"), "x").unwrap();

        let mut entries = Vec::new();
        walk_directory(dir.path(), &mut entries);
        assert_eq!(entries.len(), 2);
    }
}
