//! Usage ledger implementations.

mod config;
mod memory;

pub use config::{ConfigError, LedgerConfig};
pub use memory::InMemoryUsageLedger;
