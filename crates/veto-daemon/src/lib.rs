//! veto-daemon — the permission daemon (§4.8): a single current-thread event
//! loop over loopback TCP, newline-delimited JSON in, newline-delimited JSON
//! out, one connection at a time so the session counters need no locking.

mod connection;
mod daemon;
mod eval;
mod sink;

pub use daemon::{Daemon, RunningDaemon};
pub use eval::evaluate;
pub use sink::{AuditEvent, AuditSink, NotifySink, NullSink, SessionRegistry};
