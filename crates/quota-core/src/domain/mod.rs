//! Domain types - identities, feature kinds, limits and usage arithmetic.

mod feature;
mod identity;
mod usage;

pub use feature::{Allowance, FeatureKind, LimitPolicy, UNLIMITED_SENTINEL};
pub use identity::{AttemptId, IdentityKey};
pub use usage::{RecordOutcome, UsageStatus};
