//! Concrete adapter implementations for ports.

pub mod csv_report;
pub mod file_config_adapter;
#[cfg(feature = "lookup")]
pub mod http_lookup;
pub mod json_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;
