//! veto-hooks — the Hook-Config Synthesiser (§4.10): a Policy in, agent-
//! specific deny/allow data out. No I/O; the caller decides where it lands.

mod agent;
mod synth;

pub use agent::HookAgent;
pub use synth::synthesise_hooks;
