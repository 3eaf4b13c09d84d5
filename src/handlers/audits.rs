//! Audit trail handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    models::{AuditFilter, AuditsResponse, StreakReport, TradeAudit, TradeAuditInput},
    AppState,
};

/// POST /audits - Append one immutable trade record
pub async fn append_audit(
    State(state): State<Arc<AppState>>,
    Json(input): Json<TradeAuditInput>,
) -> Result<Json<TradeAudit>, (StatusCode, String)> {
    let record = state
        .audits
        .append(input)
        .await
        .map_err(|e| (e.status(), e.to_string()))?;

    Ok(Json(record))
}

/// GET /audits - Filtered slice of the audit log, ascending by timestamp
pub async fn query_audits(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AuditFilter>,
) -> Result<Json<AuditsResponse>, (StatusCode, String)> {
    let audits = state
        .audits
        .query(&filter)
        .await
        .map_err(|e| (e.status(), e.to_string()))?;

    let total = audits.len() as i64;

    Ok(Json(AuditsResponse { audits, total }))
}

/// GET /audits/streaks - Longest win/loss streaks over the matching slice
pub async fn get_streaks(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AuditFilter>,
) -> Result<Json<StreakReport>, (StatusCode, String)> {
    let report = state
        .audits
        .streak_report(&filter)
        .await
        .map_err(|e| (e.status(), e.to_string()))?;

    Ok(Json(report))
}
