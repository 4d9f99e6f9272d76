//! Deduplicated error group model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ErrorOccurrence;

/// A deduplicated error class. All occurrences sharing a fingerprint while
/// the group is unresolved are folded into one row with running counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorGroup {
    pub id: i64,
    pub fingerprint: String,
    pub category: String,
    pub error_type: String,
    pub error_message: String,
    pub first_occurred: DateTime<Utc>,
    pub last_occurred: DateTime<Utc>,
    pub occurrence_count: i64,
    pub resolved: bool,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An error group with its recent occurrences and the resolved display label.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    #[serde(flatten)]
    pub group: ErrorGroup,
    pub category_label: String,
    pub occurrences: Vec<ErrorOccurrence>,
}

/// Outcome of a `log_error` call. `Dropped` means the category (or tracking
/// as a whole) is disabled and nothing was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    Logged(i64),
    Dropped,
}

impl LogOutcome {
    /// Group id, or the wire sentinel `-1` for dropped reports.
    pub fn id(&self) -> i64 {
        match self {
            LogOutcome::Logged(id) => *id,
            LogOutcome::Dropped => -1,
        }
    }
}

/// Filters for listing error groups.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub category: Option<String>,
    pub include_resolved: bool,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            category: None,
            include_resolved: false,
            limit: 100,
            offset: 0,
        }
    }
}

/// Aggregate statistics over the store.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorStats {
    pub total_errors: i64,
    pub unresolved_errors: i64,
    pub resolved_errors: i64,
    pub by_category: Vec<CategoryStat>,
    pub most_frequent: Vec<ErrorGroup>,
    pub categories: BTreeMap<String, String>,
}

/// Per-category rollup over unresolved groups.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub category_label: String,
    pub count: i64,
    pub total_occurrences: i64,
}
