//! veto-shim — per-command interceptor scripts materialised into a
//! session's shim directory (§4.9), plus the daemon-handshake runtime behind
//! `veto shim-check`.

mod git;
mod runtime;
mod template;

pub use runtime::{check_targets, ShimCheckError};
pub use template::{commands_for, ShimPlan, ShimScript};
