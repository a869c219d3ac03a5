// handlers/protected/pets.rs - /api/users/:userID/pets handlers

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::Pet;
use crate::middleware::{ApiResponse, ApiResult, Json};

/// GET /api/users/:userID/pets
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Pet>> {
    state.ownership.user(&principal, &user_id)?;
    Ok(ApiResponse::success(state.pets.list(&user_id).await?))
}

/**
 * POST /api/users/:userID/pets - register a pet
 *
 * Expected Input:
 * ```json
 * { "name": "Rex", "species": "Dog", "breed": "Beagle", "age": 3,
 *   "gender": "M", "weight": 12.5, "allergies": "none", "imageBase64": "..." }
 * ```
 *
 * The id and owner come from the path; any supplied in the body are ignored.
 */
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
    Json(pet): Json<Pet>,
) -> ApiResult<Pet> {
    state.ownership.user(&principal, &user_id)?;
    let pet = state.pets.create(&user_id, pet).await?;
    Ok(ApiResponse::created(pet))
}

/// GET /api/users/:userID/pets/:petID
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> ApiResult<Pet> {
    let pet = state.ownership.pet(&principal, &user_id, &pet_id).await?;
    Ok(ApiResponse::success(pet))
}

/// PUT /api/users/:userID/pets/:petID - full replace
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Json(pet): Json<Pet>,
) -> ApiResult<Pet> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let pet = state.pets.update(&user_id, &pet_id, pet).await?;
    Ok(ApiResponse::success(pet))
}

/// DELETE /api/users/:userID/pets/:petID - nested records are left in place
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> ApiResult<String> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    state.pets.delete(&user_id, &pet_id).await?;
    Ok(ApiResponse::message("Pet deleted successfully"))
}
