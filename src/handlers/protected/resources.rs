// handlers/protected/resources.rs - /api/users/:userID/resources handlers

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::Resource;
use crate::middleware::{ApiResponse, ApiResult, Json};

/// GET /api/users/:userID/resources
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Resource>> {
    state.ownership.user(&principal, &user_id)?;
    Ok(ApiResponse::success(state.resources.list(&user_id).await?))
}

/// POST /api/users/:userID/resources
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
    Json(resource): Json<Resource>,
) -> ApiResult<Resource> {
    state.ownership.user(&principal, &user_id)?;
    let resource = state.resources.create(&user_id, resource).await?;
    Ok(ApiResponse::created(resource))
}

/// GET /api/users/:userID/resources/:resourceID
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, resource_id)): Path<(String, String)>,
) -> ApiResult<Resource> {
    state.ownership.user(&principal, &user_id)?;
    let resource = state.resources.get(&user_id, &resource_id).await?;
    Ok(ApiResponse::success(resource))
}

/// PUT /api/users/:userID/resources/:resourceID - full replace
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, resource_id)): Path<(String, String)>,
    Json(resource): Json<Resource>,
) -> ApiResult<Resource> {
    state.ownership.user(&principal, &user_id)?;
    let resource = state
        .resources
        .update(&user_id, &resource_id, resource)
        .await?;
    Ok(ApiResponse::success(resource))
}

/// DELETE /api/users/:userID/resources/:resourceID
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, resource_id)): Path<(String, String)>,
) -> ApiResult<String> {
    state.ownership.user(&principal, &user_id)?;
    state.resources.delete(&user_id, &resource_id).await?;
    Ok(ApiResponse::message("Resource deleted successfully"))
}
