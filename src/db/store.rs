//! The deduplicating error store

use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::TrackingConfig;
use crate::domain::{
    CategoryRegistry, CategoryStat, ErrorDetail, ErrorGroup, ErrorOccurrence, ErrorStats,
    ListFilter, LogOutcome, OccurrenceData,
};
use crate::report;

use super::models::{ErrorGroupRow, OccurrenceRow};
use super::{create_pool, run_migrations};

/// Detail queries return at most this many recent occurrences.
const DETAIL_OCCURRENCE_LIMIT: i64 = 50;

/// Error message prefix length used for fingerprinting. Two long messages
/// sharing the same prefix, type, and category dedup into one group; this
/// coarse matching is intentional.
const FINGERPRINT_MESSAGE_PREFIX: usize = 200;

/// Storage-layer failure. Fatal for the single operation that hit it; the
/// process keeps serving.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent, deduplicating aggregate store of error groups and their
/// occurrences. Cheap to clone; constructed once at startup and handed to
/// the HTTP layer.
#[derive(Clone)]
pub struct ErrorStore {
    pool: SqlitePool,
    registry: Arc<CategoryRegistry>,
    log_to_console: bool,
}

impl ErrorStore {
    pub fn new(pool: SqlitePool, registry: CategoryRegistry, log_to_console: bool) -> Self {
        Self {
            pool,
            registry: Arc::new(registry),
            log_to_console,
        }
    }

    /// Open (or create) the database at `database_path` and build the store
    /// from tracking configuration.
    pub async fn open(database_path: &str, tracking: &TrackingConfig) -> Result<Self, StoreError> {
        let pool = create_pool(database_path).await?;
        run_migrations(&pool).await?;

        Ok(Self::new(
            pool,
            CategoryRegistry::from_config(tracking),
            tracking.log_to_console,
        ))
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Record one error occurrence, deduplicating into an existing unresolved
    /// group when the fingerprint matches. Returns `Dropped` without storing
    /// anything when the category (or tracking globally) is disabled.
    pub async fn log_error(
        &self,
        category: &str,
        error_type: &str,
        error_message: &str,
        data: OccurrenceData,
    ) -> Result<LogOutcome, StoreError> {
        if !self.registry.is_enabled(category) {
            return Ok(LogOutcome::Dropped);
        }
        self.registry.ensure_registered(category);

        if self.log_to_console {
            tracing::warn!(
                category = %category,
                "{}: {}",
                error_type,
                truncate_chars(error_message, 100)
            );
        }

        let timestamp = now_timestamp();
        let fingerprint = fingerprint(category, error_type, error_message);

        let console_logs = data
            .console_logs
            .as_ref()
            .filter(|logs| !logs.is_empty())
            .and_then(|logs| serde_json::to_string(logs).ok());
        let network_errors = data
            .network_errors
            .as_ref()
            .and_then(|v| serde_json::to_string(v).ok());
        let request_params = data
            .request_params
            .as_ref()
            .and_then(|v| serde_json::to_string(v).ok());
        let extra_data = data
            .extra_data
            .as_ref()
            .filter(|map| !map.is_empty())
            .and_then(|map| serde_json::to_string(map).ok());

        let mut tx = self.pool.begin().await?;

        // Find-or-create against the partial unique index: at most one
        // unresolved group per fingerprint, even under concurrent writers.
        let group_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO error_groups (
                fingerprint, category, error_type, error_message,
                first_occurred, last_occurred, occurrence_count, resolved, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, 1, 0, ?)
            ON CONFLICT(fingerprint) WHERE resolved = 0 DO UPDATE
                SET last_occurred = excluded.last_occurred,
                    occurrence_count = error_groups.occurrence_count + 1
            RETURNING id
            "#,
        )
        .bind(&fingerprint)
        .bind(category)
        .bind(error_type)
        .bind(error_message)
        .bind(&timestamp)
        .bind(&timestamp)
        .bind(&timestamp)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO error_occurrences (
                error_group_id, timestamp, category, source, context, stack_trace,
                page_url, screenshot_path, console_logs, network_errors,
                request_url, request_params, http_status, response_body,
                domain, job_id, run_id, suite, test_id, test_name, extra_data
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(group_id)
        .bind(&timestamp)
        .bind(category)
        .bind(&data.source)
        .bind(&data.context)
        .bind(&data.stack_trace)
        .bind(&data.page_url)
        .bind(&data.screenshot_path)
        .bind(&console_logs)
        .bind(&network_errors)
        .bind(&data.request_url)
        .bind(&request_params)
        .bind(data.http_status)
        .bind(&data.response_body)
        .bind(&data.domain)
        .bind(data.job_id)
        .bind(&data.run_id)
        .bind(&data.suite)
        .bind(&data.test_id)
        .bind(&data.test_name)
        .bind(&extra_data)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LogOutcome::Logged(group_id))
    }

    /// List error groups, most recently occurred first.
    pub async fn list_errors(&self, filter: &ListFilter) -> Result<Vec<ErrorGroup>, StoreError> {
        let mut sql = String::from("SELECT * FROM error_groups WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(category) = &filter.category {
            sql.push_str(" AND category = ?");
            bindings.push(category.clone());
        }

        if !filter.include_resolved {
            sql.push_str(" AND resolved = 0");
        }

        sql.push_str(" ORDER BY last_occurred DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, ErrorGroupRow>(&sql);
        for binding in &bindings {
            q = q.bind(binding);
        }
        q = q.bind(filter.limit).bind(filter.offset);

        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(ErrorGroupRow::into_group).collect())
    }

    /// Group with its most recent occurrences and resolved category label.
    pub async fn error_detail(&self, group_id: i64) -> Result<Option<ErrorDetail>, StoreError> {
        let row = sqlx::query_as::<_, ErrorGroupRow>("SELECT * FROM error_groups WHERE id = ?")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let occurrences = sqlx::query_as::<_, OccurrenceRow>(
            "SELECT * FROM error_occurrences WHERE error_group_id = ? ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(group_id)
        .bind(DETAIL_OCCURRENCE_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let group = row.into_group();
        let category_label = self.registry.label_of(&group.category);

        Ok(Some(ErrorDetail {
            group,
            category_label,
            occurrences: occurrences
                .into_iter()
                .map(OccurrenceRow::into_occurrence)
                .collect(),
        }))
    }

    /// Fetch a single occurrence.
    pub async fn occurrence(
        &self,
        occurrence_id: i64,
    ) -> Result<Option<ErrorOccurrence>, StoreError> {
        let row = sqlx::query_as::<_, OccurrenceRow>("SELECT * FROM error_occurrences WHERE id = ?")
            .bind(occurrence_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(OccurrenceRow::into_occurrence))
    }

    /// Mark a group resolved. Returns false when the id does not exist.
    pub async fn mark_resolved(
        &self,
        group_id: i64,
        notes: Option<&str>,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE error_groups SET resolved = 1, resolution_notes = ? WHERE id = ?")
                .bind(notes)
                .bind(group_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach a note to a group without resolving it.
    pub async fn add_note(&self, group_id: i64, note: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE error_groups SET resolution_notes = ? WHERE id = ?")
            .bind(note)
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a group and all of its occurrences.
    pub async fn delete_error(&self, group_id: i64) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM error_occurrences WHERE error_group_id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM error_groups WHERE id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every resolved group and its occurrences atomically. Returns
    /// the number of groups removed.
    pub async fn clear_resolved(&self) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM error_occurrences WHERE error_group_id IN \
             (SELECT id FROM error_groups WHERE resolved = 1)",
        )
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM error_groups WHERE resolved = 1")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// Aggregate statistics: totals, per-category breakdown over unresolved
    /// groups, the ten most frequent unresolved groups, and the label map.
    pub async fn stats(&self) -> Result<ErrorStats, StoreError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM error_groups")
            .fetch_one(&self.pool)
            .await?;
        let unresolved =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM error_groups WHERE resolved = 0")
                .fetch_one(&self.pool)
                .await?;

        #[derive(sqlx::FromRow)]
        struct CategoryRow {
            category: String,
            count: i64,
            total_occurrences: i64,
        }

        let by_category = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT category, COUNT(*) as count, SUM(occurrence_count) as total_occurrences
            FROM error_groups WHERE resolved = 0
            GROUP BY category ORDER BY total_occurrences DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let most_frequent = sqlx::query_as::<_, ErrorGroupRow>(
            "SELECT * FROM error_groups WHERE resolved = 0 ORDER BY occurrence_count DESC LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ErrorStats {
            total_errors: total,
            unresolved_errors: unresolved,
            resolved_errors: total - unresolved,
            by_category: by_category
                .into_iter()
                .map(|row| CategoryStat {
                    category_label: self.registry.label_of(&row.category),
                    category: row.category,
                    count: row.count,
                    total_occurrences: row.total_occurrences,
                })
                .collect(),
            most_frequent: most_frequent
                .into_iter()
                .map(ErrorGroupRow::into_group)
                .collect(),
            categories: self.registry.snapshot(),
        })
    }

    /// Render a debug report for a group. With no `occurrence_id` the most
    /// recent occurrence is used; a group with none still gets a report.
    pub async fn debug_report(
        &self,
        group_id: i64,
        occurrence_id: Option<i64>,
    ) -> Result<Option<String>, StoreError> {
        let Some(detail) = self.error_detail(group_id).await? else {
            return Ok(None);
        };

        let occurrence = match occurrence_id {
            Some(id) => self.occurrence(id).await?,
            None => detail.occurrences.first().cloned(),
        };

        Ok(Some(report::render(&detail, occurrence.as_ref())))
    }
}

/// Stable dedup key over category, error type, and the message prefix.
pub fn fingerprint(category: &str, error_type: &str, error_message: &str) -> String {
    let prefix: String = error_message.chars().take(FINGERPRINT_MESSAGE_PREFIX).collect();
    let normalized = format!("{category}:{error_type}:{prefix}");
    format!("{:x}", md5::compute(normalized.as_bytes()))
}

/// RFC 3339 UTC with fixed microsecond precision, so stored text sorts
/// chronologically.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint("api", "Timeout", "Request timed out");
        let b = fingerprint("api", "Timeout", "Request timed out");
        assert_eq!(a, b);

        assert_ne!(a, fingerprint("server", "Timeout", "Request timed out"));
        assert_ne!(a, fingerprint("api", "ConnectionError", "Request timed out"));
    }

    #[test]
    fn test_fingerprint_truncates_message_prefix() {
        let prefix: String = "x".repeat(200);
        let a = fingerprint("api", "Error", &format!("{prefix}tail one"));
        let b = fingerprint("api", "Error", &format!("{prefix}different tail"));

        // Same 200-char prefix dedups regardless of the tail
        assert_eq!(a, b);

        let c = fingerprint("api", "Error", &prefix[..199]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_timestamps_sort_lexicographically() {
        let earlier = "2026-08-06T10:00:00.000001Z";
        let later = "2026-08-06T10:00:00.000002Z";
        assert!(earlier < later);

        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
    }
}
