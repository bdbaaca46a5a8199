//! Protocol domain - global settings and the admin gate

mod access_control;
mod protocol_config;

pub use access_control::ensure_admin;
pub use protocol_config::ProtocolConfig;
