use serde::Serialize;

use super::Allowance;

/// Consumption status of one identity for one feature kind today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageStatus {
    pub used: u64,
    pub limit: Allowance,
    pub remaining: Allowance,
    pub blocked: bool,
}

impl UsageStatus {
    /// Derive the status for `used` accepted events against `limit`.
    ///
    /// Unlimited kinds never block and always have unlimited remaining.
    pub fn evaluate(used: u64, limit: Allowance) -> Self {
        match limit {
            Allowance::Unlimited => Self {
                used,
                limit,
                remaining: Allowance::Unlimited,
                blocked: false,
            },
            Allowance::Limited(max) => Self {
                used,
                limit,
                remaining: Allowance::Limited(max.saturating_sub(used)),
                blocked: used >= max,
            },
        }
    }
}

/// Result of recording an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    #[serde(flatten)]
    pub status: UsageStatus,
    /// True when this call caused the increment.
    pub was_new: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_metered_status() {
        let status = UsageStatus::evaluate(0, Allowance::Limited(3));
        assert_eq!(status.remaining, Allowance::Limited(3));
        assert!(!status.blocked);
    }

    #[test]
    fn test_limit_reached_and_overshoot() {
        let at_limit = UsageStatus::evaluate(3, Allowance::Limited(3));
        assert_eq!(at_limit.remaining, Allowance::Limited(0));
        assert!(at_limit.blocked);

        let past_limit = UsageStatus::evaluate(4, Allowance::Limited(3));
        assert_eq!(past_limit.remaining, Allowance::Limited(0));
        assert!(past_limit.blocked);
    }

    #[test]
    fn test_zero_limit_blocks_immediately() {
        assert!(UsageStatus::evaluate(0, Allowance::Limited(0)).blocked);
    }

    #[test]
    fn test_unlimited_never_blocks() {
        let status = UsageStatus::evaluate(10_000, Allowance::Unlimited);
        assert_eq!(status.remaining, Allowance::Unlimited);
        assert!(!status.blocked);
    }

    #[test]
    fn test_record_outcome_serializes_flat() {
        let outcome = RecordOutcome {
            status: UsageStatus::evaluate(1, Allowance::Unlimited),
            was_new: true,
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "used": 1,
                "limit": -1,
                "remaining": -1,
                "blocked": false,
                "wasNew": true
            })
        );
    }
}
