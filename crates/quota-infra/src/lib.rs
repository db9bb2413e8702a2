//! # Quota Infrastructure
//!
//! Concrete implementations of the ports defined in `quota-core`:
//! the in-memory usage ledger, clocks and the request identity resolver.

pub mod clock;
pub mod identity;
pub mod ledger;

pub use clock::{ManualClock, SystemClock};
pub use identity::HeaderIdentityResolver;
pub use ledger::{ConfigError, InMemoryUsageLedger, LedgerConfig};
