//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Usage counters as clients see them. `-1` in `limit` and `remaining`
/// means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageView {
    pub used: u64,
    pub limit: i64,
    pub remaining: i64,
    pub blocked: bool,
}

/// Response of the usage query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    pub usage: UsageView,
}

/// Response of the record/consume endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub usage: UsageView,
    pub was_new: bool,
}

/// Optional JSON body accepted by the record/consume endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRequest {
    pub user_key: Option<String>,
    pub attempt_id: Option<String>,
}

/// Query parameters accepted alongside (or instead of) headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageQuery {
    pub user_key: Option<String>,
    pub attempt_id: Option<String>,
    pub kind: Option<String>,
}
