// handlers/protected/users.rs - /api/users handlers

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{User, UserProfile};
use crate::middleware::{ApiResponse, ApiResult, Json};
use crate::services::{ProfileUpdate, ServiceError, UserDetails};

/// POST /api/users - save the caller's own user document
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(details): Json<UserDetails>,
) -> ApiResult<UserProfile> {
    let user = match state.users.get_by_id(&principal.user_id).await? {
        Some(_) => state.users.replace(&principal.user_id, details).await?,
        None => {
            let user = User {
                user_id: principal.user_id.clone(),
                name: details.name,
                email: details.email,
                phone: details.phone,
                password: String::new(),
            };
            state.users.save(&user).await?;
            user
        }
    };
    Ok(ApiResponse::created(user.into()))
}

/// PUT /api/users/profile - change any of name, email, phone for the caller
pub async fn update_profile(
    State(state): State<AppState>,
    principal: Principal,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<UserProfile> {
    let user = state.users.update_profile(&principal.user_id, update).await?;
    Ok(ApiResponse::success(user.into()))
}

/// GET /api/users/:userID
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
) -> ApiResult<UserProfile> {
    state.ownership.user(&principal, &user_id)?;
    let user = state
        .users
        .get_by_id(&user_id)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;
    Ok(ApiResponse::success(user.into()))
}

/// PUT /api/users/:userID - replace name, email and phone
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
    Json(details): Json<UserDetails>,
) -> ApiResult<UserProfile> {
    state.ownership.user(&principal, &user_id)?;
    let user = state.users.replace(&user_id, details).await?;
    Ok(ApiResponse::success(user.into()))
}

/// DELETE /api/users/:userID
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
) -> ApiResult<String> {
    state.ownership.user(&principal, &user_id)?;
    state.users.delete(&user_id).await?;
    tracing::info!("Deleted user {}", user_id);
    Ok(ApiResponse::message("User deleted successfully"))
}
