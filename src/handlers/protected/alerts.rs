// handlers/protected/alerts.rs - alert handlers

use axum::extract::{Path, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::Alert;
use crate::middleware::{ApiResponse, ApiResult, Json, Query};

type AlertPath = Path<(String, String, String)>;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub unread: bool,
}

/// GET /api/users/:userID/pets/:petID/alerts?unread=true - newest first
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Alert>> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let alerts = state.alerts.list(&user_id, &pet_id, params.unread).await?;
    Ok(ApiResponse::success(alerts))
}

/// POST /api/users/:userID/pets/:petID/alerts
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Json(alert): Json<Alert>,
) -> ApiResult<Alert> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let alert = state.alerts.create(&user_id, &pet_id, alert).await?;
    Ok(ApiResponse::created(alert))
}

/// GET /api/users/:userID/pets/:petID/alerts/:alertID
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, alert_id)): AlertPath,
) -> ApiResult<Alert> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let alert = state.alerts.get(&user_id, &pet_id, &alert_id).await?;
    state.ownership.scoped(&alert, &user_id, &pet_id)?;
    Ok(ApiResponse::success(alert))
}

/// PATCH /api/users/:userID/pets/:petID/alerts/:alertID/read
pub async fn mark_read(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, alert_id)): AlertPath,
) -> ApiResult<Alert> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let existing = state.alerts.get(&user_id, &pet_id, &alert_id).await?;
    state.ownership.scoped(&existing, &user_id, &pet_id)?;

    let alert = state.alerts.mark_read(&user_id, &pet_id, &alert_id).await?;
    Ok(ApiResponse::success(alert))
}

/// DELETE /api/users/:userID/pets/:petID/alerts/:alertID
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, alert_id)): AlertPath,
) -> ApiResult<String> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let existing = state.alerts.get(&user_id, &pet_id, &alert_id).await?;
    state.ownership.scoped(&existing, &user_id, &pet_id)?;

    state.alerts.delete(&user_id, &pet_id, &alert_id).await?;
    Ok(ApiResponse::message("Alert deleted successfully"))
}
