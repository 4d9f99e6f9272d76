//! Error group API routes: list, detail, resolve, notes, delete, stats

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{ErrorDetail, ErrorGroup, ErrorStats, ListFilter};

use super::{AppError, AppState, StatusBody};

#[derive(Debug, Deserialize)]
pub struct ListErrorsQuery {
    pub category: Option<String>,
    #[serde(default)]
    pub include_resolved: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Serialize)]
pub struct ListErrorsResponse {
    pub success: bool,
    pub errors: Vec<ErrorGroup>,
    pub stats: ErrorStats,
    pub categories: BTreeMap<String, String>,
}

pub async fn list_errors(
    State(state): State<AppState>,
    Query(query): Query<ListErrorsQuery>,
) -> Result<Json<ListErrorsResponse>, AppError> {
    let filter = ListFilter {
        category: query.category.filter(|c| c != "all"),
        include_resolved: query.include_resolved,
        limit: query.limit,
        offset: query.offset,
    };

    let errors = state.store.list_errors(&filter).await?;
    let stats = state.store.stats().await?;
    let categories = state.store.registry().snapshot();

    Ok(Json(ListErrorsResponse {
        success: true,
        errors,
        stats,
        categories,
    }))
}

#[derive(Debug, Serialize)]
pub struct ErrorDetailResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

pub async fn get_error_detail(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<ErrorDetailResponse>, AppError> {
    let detail = state
        .store
        .error_detail(group_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Error not found".to_string()))?;

    Ok(Json(ErrorDetailResponse {
        success: true,
        error: detail,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DebugReportQuery {
    pub occurrence_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DebugReportResponse {
    pub success: bool,
    pub debug_code: String,
}

pub async fn get_debug_report(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Query(query): Query<DebugReportQuery>,
) -> Result<Json<DebugReportResponse>, AppError> {
    let report = state
        .store
        .debug_report(group_id, query.occurrence_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Error not found".to_string()))?;

    Ok(Json(DebugReportResponse {
        success: true,
        debug_code: report,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResolveRequest {
    pub notes: Option<String>,
}

pub async fn resolve_error(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<StatusBody>, AppError> {
    let success = state
        .store
        .mark_resolved(group_id, req.notes.as_deref())
        .await?;

    Ok(Json(StatusBody { success }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NoteRequest {
    pub note: String,
}

pub async fn add_note(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<StatusBody>, AppError> {
    let note = req.note.trim();
    if note.is_empty() {
        return Err(AppError::BadRequest("Note is required".to_string()));
    }

    let success = state.store.add_note(group_id, note).await?;
    Ok(Json(StatusBody { success }))
}

pub async fn delete_error(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<StatusBody>, AppError> {
    let success = state.store.delete_error(group_id).await?;
    Ok(Json(StatusBody { success }))
}

#[derive(Debug, Serialize)]
pub struct ClearResolvedResponse {
    pub success: bool,
    pub cleared: u64,
}

pub async fn clear_resolved(
    State(state): State<AppState>,
) -> Result<Json<ClearResolvedResponse>, AppError> {
    let cleared = state.store.clear_resolved().await?;
    Ok(Json(ClearResolvedResponse {
        success: true,
        cleared,
    }))
}

/// Raw stats payload for dashboard polling; no envelope.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<ErrorStats>, AppError> {
    Ok(Json(state.store.stats().await?))
}
