//! veto-core — the Policy data model, wire protocol, configuration, and error kinds
//! shared by every other `veto-*` crate.

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use config::{VetoConfig, VetoDaemonConfig};
pub use error::{Error, Result};
pub use protocol::{
    encode_request_line, encode_response_line, parse_request_line, parse_response_line,
};
pub use types::*;
