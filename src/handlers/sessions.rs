//! Live session state handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    models::{SessionSnapshot, SessionState},
    AppState,
};

/// PUT /bots/{bot_id}/session - Publish the current run's metrics
pub async fn publish_session(
    State(state): State<Arc<AppState>>,
    Path(bot_id): Path<Uuid>,
    Json(snapshot): Json<SessionSnapshot>,
) -> Result<Json<SessionState>, (StatusCode, String)> {
    if snapshot.bot_id != bot_id {
        return Err((
            StatusCode::BAD_REQUEST,
            "bot_id in path and body must match".to_string(),
        ));
    }

    let published = state
        .sessions
        .publish(snapshot)
        .await
        .map_err(|e| (e.status(), e.to_string()))?;

    Ok(Json(published))
}

/// GET /bots/{bot_id}/session - Read the latest published session state
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(bot_id): Path<Uuid>,
) -> Result<Json<SessionState>, (StatusCode, String)> {
    let session = state
        .sessions
        .current(bot_id)
        .await
        .map_err(|e| (e.status(), e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "No session state for bot".to_string()))?;

    Ok(Json(session))
}
