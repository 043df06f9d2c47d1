//! Port traits implemented by adapters.

pub mod config_port;
pub mod lookup_port;
pub mod snapshot_port;
