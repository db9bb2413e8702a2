//! Application configuration loaded from environment variables.

use std::env;

use quota_core::domain::FeatureKind;
use quota_infra::LedgerConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub ledger: LedgerConfig,
    /// Kind used when a usage query names none.
    pub default_kind: FeatureKind,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            ledger: LedgerConfig::from_env(),
            default_kind: Self::parse_default_kind(env::var("QUOTA_DEFAULT_KIND").ok()),
        }
    }

    fn parse_default_kind(raw: Option<String>) -> FeatureKind {
        match raw.map(FeatureKind::parse) {
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring QUOTA_DEFAULT_KIND");
                FeatureKind::practice()
            }
            None => FeatureKind::practice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kind_fallbacks() {
        assert_eq!(AppConfig::parse_default_kind(None), FeatureKind::practice());
        assert_eq!(
            AppConfig::parse_default_kind(Some("not a kind".to_string())),
            FeatureKind::practice()
        );
        assert_eq!(
            AppConfig::parse_default_kind(Some("Speech-To-Text".to_string())),
            FeatureKind::speech_to_text()
        );
    }
}
