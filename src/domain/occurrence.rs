//! Raw error occurrence model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw reported instance of an error, always owned by exactly one group.
/// Append-only; deleted only by cascade from its group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOccurrence {
    pub id: i64,
    pub error_group_id: i64,
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub source: Option<String>,
    pub context: Option<String>,
    pub stack_trace: Option<String>,
    pub page_url: Option<String>,
    pub screenshot_path: Option<String>,
    pub console_logs: Option<Vec<ConsoleLogEntry>>,
    pub network_errors: Option<serde_json::Value>,
    pub request_url: Option<String>,
    pub request_params: Option<serde_json::Value>,
    pub http_status: Option<i64>,
    pub response_body: Option<String>,
    pub domain: Option<String>,
    pub job_id: Option<i64>,
    pub run_id: Option<String>,
    pub suite: Option<String>,
    pub test_id: Option<String>,
    pub test_name: Option<String>,
    pub extra_data: Option<serde_json::Map<String, serde_json::Value>>,
}

/// One captured browser console entry. Collectors send either `text` or
/// `message` for the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleLogEntry {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
    pub message: Option<String>,
}

impl ConsoleLogEntry {
    pub fn is_error(&self) -> bool {
        self.kind.as_deref() == Some("error")
    }

    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("")
    }
}

/// Optional contextual fields accepted alongside a new error report.
/// Everything is optional; `extra_data` holds truly arbitrary payloads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OccurrenceData {
    pub source: Option<String>,
    pub context: Option<String>,
    pub stack_trace: Option<String>,
    pub page_url: Option<String>,
    pub screenshot_path: Option<String>,
    pub console_logs: Option<Vec<ConsoleLogEntry>>,
    pub network_errors: Option<serde_json::Value>,
    pub request_url: Option<String>,
    pub request_params: Option<serde_json::Value>,
    pub http_status: Option<i64>,
    pub response_body: Option<String>,
    pub domain: Option<String>,
    pub job_id: Option<i64>,
    pub run_id: Option<String>,
    pub suite: Option<String>,
    pub test_id: Option<String>,
    pub test_name: Option<String>,
    pub extra_data: Option<serde_json::Map<String, serde_json::Value>>,
}
