//! Scan routes: run a scan, fetch one by id, and browse history.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::errors::AppError;
use crate::models::pagination::Pagination;
use crate::models::scan::{Scan, ScanHistory, ScanRequest};
use crate::services::scan::{self as scan_service, ScanFilters};
use crate::AppState;

/// POST /scan: scan a domain and store the result.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ScanRequest>,
) -> Result<Json<Scan>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = state.scanner.scan(&body.domain).await?;
    let scan = scan_service::insert(&state.db, &result).await?;
    Ok(Json(scan))
}

/// GET /scan/{id}: get a stored scan.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Scan>, AppError> {
    let scan = scan_service::find_by_id(&state.db, id).await?;
    Ok(Json(scan))
}

/// GET /history: list scans newest first, optionally filtered by domain.
pub async fn history(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ScanFilters>,
) -> Result<Json<ScanHistory>, AppError> {
    let result = scan_service::history(&state.db, &filters, &pagination).await?;
    Ok(Json(result))
}
