//! Application state - shared across all handlers.

use std::sync::Arc;

use quota_core::domain::FeatureKind;
use quota_core::ports::{Clock, IdentityResolver, UsageLedger};
use quota_infra::{HeaderIdentityResolver, InMemoryUsageLedger, SystemClock};

use crate::config::AppConfig;

/// Shared application state.
///
/// The ledger is built once here and handed to every handler; nothing else
/// holds quota state. `clock` is the same clock the ledger counts days with.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn UsageLedger>,
    pub clock: Arc<dyn Clock>,
    pub identity: Arc<dyn IdentityResolver>,
    pub default_kind: FeatureKind,
}

impl AppState {
    /// Build the application state from configuration.
    pub fn new(config: &AppConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let ledger = InMemoryUsageLedger::new(config.ledger.clone(), clock.clone());

        tracing::info!(
            retention_days = config.ledger.retention_days,
            default_limit = %config.ledger.policy.default_limit(),
            default_kind = %config.default_kind,
            "Usage ledger initialized"
        );

        Self::with_ledger(Arc::new(ledger), clock, config.default_kind.clone())
    }

    pub fn with_ledger(
        ledger: Arc<dyn UsageLedger>,
        clock: Arc<dyn Clock>,
        default_kind: FeatureKind,
    ) -> Self {
        Self {
            ledger,
            clock,
            identity: Arc::new(HeaderIdentityResolver),
            default_kind,
        }
    }
}
