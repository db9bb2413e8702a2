use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Wire value standing in for "no limit" in both `limit` and `remaining`.
pub const UNLIMITED_SENTINEL: i64 = -1;

/// A named category of metered or unmetered action.
///
/// Normalized to lower case; only ASCII alphanumerics, `-` and `_` are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureKind(String);

impl FeatureKind {
    pub const PRACTICE: &'static str = "practice";
    pub const SPEECH_TO_TEXT: &'static str = "speech-to-text";

    pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let normalized = raw.as_ref().trim().to_ascii_lowercase();
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(DomainError::InvalidFeatureKind(raw.as_ref().to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn practice() -> Self {
        Self(Self::PRACTICE.to_string())
    }

    pub fn speech_to_text() -> Self {
        Self(Self::SPEECH_TO_TEXT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FeatureKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FeatureKind {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FeatureKind> for String {
    fn from(kind: FeatureKind) -> Self {
        kind.0
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A daily count that is either finite or unlimited.
///
/// Used both for a kind's configured limit and for the remaining allowance.
/// Serializes to `-1` when unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Allowance {
    Limited(u64),
    Unlimited,
}

impl Allowance {
    pub fn to_wire(self) -> i64 {
        match self {
            Allowance::Limited(n) => i64::try_from(n).unwrap_or(i64::MAX),
            Allowance::Unlimited => UNLIMITED_SENTINEL,
        }
    }
}

impl From<Allowance> for i64 {
    fn from(allowance: Allowance) -> Self {
        allowance.to_wire()
    }
}

impl TryFrom<i64> for Allowance {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            UNLIMITED_SENTINEL => Ok(Allowance::Unlimited),
            n if n >= 0 => Ok(Allowance::Limited(n as u64)),
            n => Err(DomainError::InvalidLimit(n.to_string())),
        }
    }
}

impl FromStr for Allowance {
    type Err = DomainError;

    /// Accepts a non-negative integer, `-1`, or `unlimited`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") {
            return Ok(Allowance::Unlimited);
        }
        let value: i64 = s
            .parse()
            .map_err(|_| DomainError::InvalidLimit(s.to_string()))?;
        Allowance::try_from(value)
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allowance::Limited(n) => write!(f, "{}", n),
            Allowance::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// Per-kind daily limits plus the fallback for kinds nobody configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitPolicy {
    limits: HashMap<FeatureKind, Allowance>,
    default_limit: Allowance,
}

impl LimitPolicy {
    pub fn new(default_limit: Allowance) -> Self {
        Self {
            limits: HashMap::new(),
            default_limit,
        }
    }

    pub fn with_limit(mut self, kind: FeatureKind, limit: Allowance) -> Self {
        self.limits.insert(kind, limit);
        self
    }

    pub fn with_default_limit(mut self, default_limit: Allowance) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Parse a `kind=limit` list separated by commas,
    /// e.g. `practice=3,speech-to-text=unlimited`.
    pub fn parse(raw: &str, default_limit: Allowance) -> Result<Self, DomainError> {
        let mut policy = Self::new(default_limit);

        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (kind, limit) = pair
                .split_once('=')
                .ok_or_else(|| DomainError::InvalidLimit(pair.to_string()))?;
            policy = policy.with_limit(kind.parse()?, limit.parse()?);
        }

        Ok(policy)
    }

    /// The configured limit, or `None` when the kind is unknown.
    pub fn configured(&self, kind: &FeatureKind) -> Option<Allowance> {
        self.limits.get(kind).copied()
    }

    pub fn default_limit(&self) -> Allowance {
        self.default_limit
    }

    pub fn limit_for(&self, kind: &FeatureKind) -> Allowance {
        self.configured(kind).unwrap_or(self.default_limit)
    }
}

impl Default for LimitPolicy {
    /// Three practice attempts a day; transcription is tracked but unmetered.
    fn default() -> Self {
        Self::new(Allowance::Limited(3))
            .with_limit(FeatureKind::practice(), Allowance::Limited(3))
            .with_limit(FeatureKind::speech_to_text(), Allowance::Unlimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_kind_normalized() {
        let kind = FeatureKind::parse(" Practice ").unwrap();
        assert_eq!(kind, FeatureKind::practice());
    }

    #[test]
    fn test_feature_kind_rejects_garbage() {
        assert!(FeatureKind::parse("").is_err());
        assert!(FeatureKind::parse("speech to text").is_err());
        assert!(FeatureKind::parse("a/b").is_err());
    }

    #[test]
    fn test_allowance_from_str() {
        assert_eq!("3".parse::<Allowance>(), Ok(Allowance::Limited(3)));
        assert_eq!("0".parse::<Allowance>(), Ok(Allowance::Limited(0)));
        assert_eq!("-1".parse::<Allowance>(), Ok(Allowance::Unlimited));
        assert_eq!("Unlimited".parse::<Allowance>(), Ok(Allowance::Unlimited));
        assert!("-2".parse::<Allowance>().is_err());
        assert!("lots".parse::<Allowance>().is_err());
    }

    #[test]
    fn test_allowance_serializes_sentinel() {
        assert_eq!(serde_json::to_string(&Allowance::Unlimited).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&Allowance::Limited(5)).unwrap(), "5");
    }

    #[test]
    fn test_default_policy() {
        let policy = LimitPolicy::default();
        assert_eq!(
            policy.limit_for(&FeatureKind::practice()),
            Allowance::Limited(3)
        );
        assert_eq!(
            policy.limit_for(&FeatureKind::speech_to_text()),
            Allowance::Unlimited
        );
    }

    #[test]
    fn test_unknown_kind_falls_back_to_default() {
        let policy = LimitPolicy::new(Allowance::Limited(7));
        let kind = FeatureKind::parse("resume-review").unwrap();
        assert_eq!(policy.configured(&kind), None);
        assert_eq!(policy.limit_for(&kind), Allowance::Limited(7));
    }

    #[test]
    fn test_parse_policy() {
        let policy = LimitPolicy::parse(
            "practice=5, speech-to-text=unlimited,,tts=-1",
            Allowance::Limited(1),
        )
        .unwrap();

        assert_eq!(
            policy.limit_for(&FeatureKind::practice()),
            Allowance::Limited(5)
        );
        assert_eq!(
            policy.limit_for(&FeatureKind::parse("tts").unwrap()),
            Allowance::Unlimited
        );
        assert_eq!(policy.default_limit(), Allowance::Limited(1));
    }

    #[test]
    fn test_parse_policy_rejects_malformed_pairs() {
        assert!(LimitPolicy::parse("practice", Allowance::Limited(3)).is_err());
        assert!(LimitPolicy::parse("practice=x", Allowance::Limited(3)).is_err());
        assert!(LimitPolicy::parse("=3", Allowance::Limited(3)).is_err());
    }
}
