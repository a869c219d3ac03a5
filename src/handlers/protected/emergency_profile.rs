// handlers/protected/emergency_profile.rs - one emergency profile per pet

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::EmergencyProfile;
use crate::middleware::{ApiResponse, ApiResult, Json};

type PetPath = Path<(String, String)>;

/// GET /api/users/:userID/pets/:petID/emergencyProfile
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): PetPath,
) -> ApiResult<EmergencyProfile> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let profile = state.emergency_profiles.get(&user_id, &pet_id).await?;
    Ok(ApiResponse::success(profile))
}

/// POST /api/users/:userID/pets/:petID/emergencyProfile - create or overwrite
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): PetPath,
    Json(profile): Json<EmergencyProfile>,
) -> ApiResult<EmergencyProfile> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let profile = state.emergency_profiles.set(&user_id, &pet_id, profile).await?;
    Ok(ApiResponse::created(profile))
}

/// PUT /api/users/:userID/pets/:petID/emergencyProfile - 404 until one exists
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): PetPath,
    Json(profile): Json<EmergencyProfile>,
) -> ApiResult<EmergencyProfile> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let profile = state
        .emergency_profiles
        .update(&user_id, &pet_id, profile)
        .await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE /api/users/:userID/pets/:petID/emergencyProfile
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): PetPath,
) -> ApiResult<String> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    state.emergency_profiles.delete(&user_id, &pet_id).await?;
    Ok(ApiResponse::message("Emergency profile deleted successfully"))
}
