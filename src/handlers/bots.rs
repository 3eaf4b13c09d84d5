//! Bot lifecycle handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{BotConfig, BotPatch, CreateBotRequest, DisplayStatus, ListBotsResponse},
    AppState,
};

/// GET /users/{owner_id}/bots - List all bots for an owner
pub async fn list_bots(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<ListBotsResponse>, (StatusCode, String)> {
    let bots = state
        .registry
        .list(owner_id)
        .await
        .map_err(|e| (e.status(), e.to_string()))?;

    let total = bots.len() as i64;

    Ok(Json(ListBotsResponse { bots, total }))
}

/// POST /users/{owner_id}/bots - Create a new bot
pub async fn create_bot(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<Uuid>,
    Json(req): Json<CreateBotRequest>,
) -> Result<Json<BotConfig>, (StatusCode, String)> {
    if let Err(errors) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, errors.to_string()));
    }

    let bot = state
        .registry
        .create(owner_id, req)
        .await
        .map_err(|e| (e.status(), e.to_string()))?;

    Ok(Json(bot))
}

/// GET /users/{owner_id}/bots/{bot_id} - Get bot details
pub async fn get_bot(
    State(state): State<Arc<AppState>>,
    Path((owner_id, bot_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BotConfig>, (StatusCode, String)> {
    let bot = state
        .registry
        .get(owner_id, bot_id)
        .await
        .map_err(|e| (e.status(), e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "Bot not found".to_string()))?;

    Ok(Json(bot))
}

/// PATCH /users/{owner_id}/bots/{bot_id} - Partial update of a bot
pub async fn update_bot(
    State(state): State<Arc<AppState>>,
    Path((owner_id, bot_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<BotPatch>,
) -> Result<Json<BotConfig>, (StatusCode, String)> {
    let bot = state
        .registry
        .update(owner_id, bot_id, patch)
        .await
        .map_err(|e| (e.status(), e.to_string()))?;

    Ok(Json(bot))
}

/// DELETE /users/{owner_id}/bots/{bot_id} - Delete a bot and its mirror entries
pub async fn delete_bot(
    State(state): State<Arc<AppState>>,
    Path((owner_id, bot_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .registry
        .delete(owner_id, bot_id)
        .await
        .map_err(|e| (e.status(), e.to_string()))?;

    Ok(StatusCode::OK)
}

/// GET /bots/{bot_id}/status - Read the mirrored display status
pub async fn get_display_status(
    State(state): State<Arc<AppState>>,
    Path(bot_id): Path<Uuid>,
) -> Result<Json<DisplayStatus>, (StatusCode, String)> {
    let status = state
        .registry
        .display_status(bot_id)
        .await
        .map_err(|e| (e.status(), e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "No status for bot".to_string()))?;

    Ok(Json(status))
}
