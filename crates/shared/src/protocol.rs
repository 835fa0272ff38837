use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TrialResult;

/// Body of `POST /api/results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultsRequest {
    pub participant_id: String,
    pub results: Vec<TrialResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultsResponse {
    pub submission_id: i64,
    /// Where the server-side CSV report landed, if the write succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
}
