//! Ledger configuration loaded from environment variables.

use quota_core::DomainError;
use quota_core::domain::LimitPolicy;

const DEFAULT_RETENTION_DAYS: u32 = 1;

/// In-memory ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Per-kind daily limits and the fallback for unknown kinds.
    pub policy: LimitPolicy,
    /// Past days kept before the sweep drops their entries.
    pub retention_days: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            policy: LimitPolicy::default(),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid QUOTA_LIMITS: {0}")]
    Limits(DomainError),

    #[error("Invalid QUOTA_DEFAULT_LIMIT: {0}")]
    DefaultLimit(DomainError),

    #[error("Invalid LEDGER_RETENTION_DAYS: {0:?}")]
    Retention(String),
}

impl LedgerConfig {
    /// Load from `QUOTA_LIMITS`, `QUOTA_DEFAULT_LIMIT` and
    /// `LEDGER_RETENTION_DAYS`, falling back to defaults on bad input.
    pub fn from_env() -> Self {
        let limits = std::env::var("QUOTA_LIMITS").ok();
        let default_limit = std::env::var("QUOTA_DEFAULT_LIMIT").ok();
        let retention = std::env::var("LEDGER_RETENTION_DAYS").ok();

        match Self::from_values(
            limits.as_deref(),
            default_limit.as_deref(),
            retention.as_deref(),
        ) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Invalid ledger configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Build from raw values. `None` means "use the default".
    ///
    /// When `limits` is given it replaces the built-in per-kind table.
    pub fn from_values(
        limits: Option<&str>,
        default_limit: Option<&str>,
        retention_days: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let base = LimitPolicy::default();

        let default_limit = match default_limit {
            Some(raw) => raw.parse().map_err(ConfigError::DefaultLimit)?,
            None => base.default_limit(),
        };

        let policy = match limits {
            Some(raw) => LimitPolicy::parse(raw, default_limit).map_err(ConfigError::Limits)?,
            None => base.with_default_limit(default_limit),
        };

        let retention_days = match retention_days {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Retention(raw.to_string()))?,
            None => DEFAULT_RETENTION_DAYS,
        };

        Ok(Self {
            policy,
            retention_days,
        })
    }
}
