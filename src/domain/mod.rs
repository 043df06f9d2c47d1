//! Core domain types and logic.

pub mod calc;
pub mod error;
pub mod fund_info;
pub mod holding;
pub mod ledger;
mod lenient;
pub mod session;
pub mod settings;
pub mod snapshot;
