//! One accepted TCP connection: read newline-delimited `CheckRequest`s,
//! evaluate each against the session's policy, write back one
//! `CheckResponse` per line. Processed start-to-finish before the accept
//! loop moves on — see the module doc on `daemon` for why.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, warn};
use veto_core::{protocol, CheckResponse, Policy, SessionState};

use crate::eval::evaluate;
use crate::sink::{AuditEvent, AuditSink, NotifySink};

pub async fn handle_connection(
    stream: TcpStream,
    policy: &Arc<Policy>,
    audit: &Arc<dyn AuditSink>,
    notify: &Arc<dyn NotifySink>,
    state: &mut SessionState,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("connection read error: {e}");
                break;
            }
        };

        let response = match protocol::parse_request_line(&line) {
            Some(request) => evaluate(&request, policy),
            None => {
                debug!("malformed request line, defaulting to allow: {line:?}");
                CheckResponse::allow()
            }
        };

        record(&response, audit, notify, state);

        let encoded = protocol::encode_response_line(&response);
        if write_half.write_all(encoded.as_bytes()).await.is_err() {
            break;
        }
    }
}

fn record(
    response: &CheckResponse,
    audit: &Arc<dyn AuditSink>,
    notify: &Arc<dyn NotifySink>,
    state: &mut SessionState,
) {
    if response.allowed {
        state.record_allowed();
        audit.record(AuditEvent::Allowed);
    } else {
        let description = response.reason.clone().unwrap_or_default();
        state.record_blocked(description.clone());
        audit.record(AuditEvent::Blocked { description });
        notify.notify_blocked(
            response.reason.as_deref().unwrap_or(""),
            response.suggest.as_deref(),
        );
    }
}
