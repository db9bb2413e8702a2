//! Standardized error responses (RFC 7807).

use serde::{Deserialize, Serialize};

use crate::dto::UsageView;

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Usage at the time of refusal, for quota errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageView>,

    /// Set when upgrading the plan lifts the refusal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<bool>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            usage: None,
            upgrade: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_usage(mut self, usage: UsageView) -> Self {
        self.usage = Some(usage);
        self
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn limit_reached(detail: impl Into<String>, usage: UsageView) -> Self {
        let mut error = Self::new(402, "Daily Limit Reached")
            .with_detail(detail)
            .with_usage(usage);
        error.error_type = "urn:quota:limit-reached".to_string();
        error.upgrade = Some(true);
        error
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(409, "Conflict").with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}
