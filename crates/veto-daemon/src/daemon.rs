//! The permission daemon itself (§4.8): one `TcpListener` on loopback, one
//! connection handled start-to-finish at a time on a single cooperative
//! event loop — so `SessionState` needs no interior mutability or atomics,
//! matching §5's "exactly one thread touches the counters" invariant.

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use veto_core::{Policy, SessionSnapshot, SessionState};

use crate::connection::handle_connection;
use crate::sink::{AuditSink, NotifySink, NullSink, SessionRegistry};

/// A constructed-but-not-yet-listening daemon.
pub struct Daemon {
    policy: Arc<Policy>,
    bind_host: String,
    audit: Arc<dyn AuditSink>,
    notify: Arc<dyn NotifySink>,
    registry: Arc<dyn SessionRegistry>,
}

impl Daemon {
    pub fn new(policy: Policy, bind_host: impl Into<String>) -> Self {
        Self {
            policy: Arc::new(policy),
            bind_host: bind_host.into(),
            audit: Arc::new(NullSink),
            notify: Arc::new(NullSink),
            registry: Arc::new(NullSink),
        }
    }

    pub fn with_sinks(
        mut self,
        audit: Arc<dyn AuditSink>,
        notify: Arc<dyn NotifySink>,
        registry: Arc<dyn SessionRegistry>,
    ) -> Self {
        self.audit = audit;
        self.notify = notify;
        self.registry = registry;
        self
    }

    /// Bind (port 0, OS-assigned) and spawn the accept loop. Resolves once
    /// the listener is bound — this is the *listening* state transition.
    pub async fn start(self) -> std::io::Result<RunningDaemon> {
        let listener = TcpListener::bind((self.bind_host.as_str(), 0)).await?;
        let port = listener.local_addr()?.port();
        info!("veto daemon listening on {}:{port}", self.bind_host);

        let (stop_tx, stop_rx) = oneshot::channel();
        let registry = self.registry.clone();
        let handle = tokio::spawn(run_loop(listener, self.policy, self.audit, self.notify, stop_rx));

        Ok(RunningDaemon {
            port,
            registry,
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

async fn run_loop(
    listener: TcpListener,
    policy: Arc<Policy>,
    audit: Arc<dyn AuditSink>,
    notify: Arc<dyn NotifySink>,
    mut stop_rx: oneshot::Receiver<()>,
) -> SessionSnapshot {
    let mut state = SessionState::new();
    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        handle_connection(stream, &policy, &audit, &notify, &mut state).await;
                    }
                    Err(e) => warn!("accept error: {e}"),
                }
            }
        }
    }
    state.snapshot()
}

/// A listening daemon. `stop()` consumes it — there is no restart, per §4.8;
/// construct a new `Daemon` instead.
pub struct RunningDaemon {
    port: u16,
    registry: Arc<dyn SessionRegistry>,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<SessionSnapshot>>,
}

impl RunningDaemon {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Close the listener, unregister from the external session registry,
    /// and return a summary snapshot of the session just ended.
    pub async fn stop(mut self) -> SessionSnapshot {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.registry.unregister(self.port);
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or_else(|_| SessionState::new().snapshot()),
            None => SessionState::new().snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use veto_core::Action;

    fn sample_policy() -> Policy {
        Policy {
            schema_version: veto_core::SCHEMA_VERSION,
            action: Action::Delete,
            include: vec!["*.test.*".into()],
            exclude: vec![],
            description: "test files protected".into(),
            command_rules: None,
            content_rules: None,
            ast_rules: None,
        }
    }

    #[tokio::test]
    async fn start_assigns_a_port_and_answers_requests() {
        let daemon = Daemon::new(sample_policy(), "127.0.0.1").start().await.unwrap();
        let port = daemon.port();
        assert_ne!(port, 0);

        let mut client = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        client
            .write_all(b"{\"action\":\"delete\",\"target\":\"a.test.ts\"}\n")
            .await
            .unwrap();

        let mut buf = [0u8; 256];
        let n = client.read(&mut buf).await.unwrap();
        let response = String::from_utf8_lossy(&buf[..n]);
        assert!(response.contains("\"allowed\":false"));

        drop(client);
        let snapshot = daemon.stop().await;
        assert_eq!(snapshot.blocked_count, 1);
    }

    #[tokio::test]
    async fn malformed_json_allows() {
        let daemon = Daemon::new(sample_policy(), "127.0.0.1").start().await.unwrap();
        let port = daemon.port();

        let mut client = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        client.write_all(b"not json at all\n").await.unwrap();

        let mut buf = [0u8; 256];
        let n = client.read(&mut buf).await.unwrap();
        let response = String::from_utf8_lossy(&buf[..n]);
        assert_eq!(response.trim(), r#"{"allowed":true}"#);

        drop(client);
        daemon.stop().await;
    }
}
