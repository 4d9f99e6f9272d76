//! Database row models for SQLx

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::{ErrorGroup, ErrorOccurrence};

/// Row type for the error_groups table
#[derive(Debug, Clone, FromRow)]
pub struct ErrorGroupRow {
    pub id: i64,
    pub fingerprint: String,
    pub category: String,
    pub error_type: String,
    pub error_message: String,
    pub first_occurred: String,
    pub last_occurred: String,
    pub occurrence_count: i64,
    pub resolved: i64,
    pub resolution_notes: Option<String>,
    pub created_at: String,
}

impl ErrorGroupRow {
    pub fn into_group(self) -> ErrorGroup {
        ErrorGroup {
            id: self.id,
            fingerprint: self.fingerprint,
            category: self.category,
            error_type: self.error_type,
            error_message: self.error_message,
            first_occurred: parse_timestamp(&self.first_occurred),
            last_occurred: parse_timestamp(&self.last_occurred),
            occurrence_count: self.occurrence_count,
            resolved: self.resolved != 0,
            resolution_notes: self.resolution_notes,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

/// Row type for the error_occurrences table. JSON-shaped columns are stored
/// as text and parsed leniently on read.
#[derive(Debug, Clone, FromRow)]
pub struct OccurrenceRow {
    pub id: i64,
    pub error_group_id: i64,
    pub timestamp: String,
    pub category: String,
    pub source: Option<String>,
    pub context: Option<String>,
    pub stack_trace: Option<String>,
    pub page_url: Option<String>,
    pub screenshot_path: Option<String>,
    pub console_logs: Option<String>,
    pub network_errors: Option<String>,
    pub request_url: Option<String>,
    pub request_params: Option<String>,
    pub http_status: Option<i64>,
    pub response_body: Option<String>,
    pub domain: Option<String>,
    pub job_id: Option<i64>,
    pub run_id: Option<String>,
    pub suite: Option<String>,
    pub test_id: Option<String>,
    pub test_name: Option<String>,
    pub extra_data: Option<String>,
}

impl OccurrenceRow {
    pub fn into_occurrence(self) -> ErrorOccurrence {
        ErrorOccurrence {
            id: self.id,
            error_group_id: self.error_group_id,
            timestamp: parse_timestamp(&self.timestamp),
            category: self.category,
            source: self.source,
            context: self.context,
            stack_trace: self.stack_trace,
            page_url: self.page_url,
            screenshot_path: self.screenshot_path,
            // A blob that fails to parse is treated as absent, never an error
            console_logs: self
                .console_logs
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok()),
            network_errors: self
                .network_errors
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok()),
            request_url: self.request_url,
            request_params: self
                .request_params
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok()),
            http_status: self.http_status,
            response_body: self.response_body,
            domain: self.domain,
            job_id: self.job_id,
            run_id: self.run_id,
            suite: self.suite,
            test_id: self.test_id,
            test_name: self.test_name,
            extra_data: self
                .extra_data
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok()),
        }
    }
}

/// Timestamps are persisted as RFC 3339 UTC text; unparseable values fall
/// back to now rather than failing the read.
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
