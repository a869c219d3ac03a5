// handlers/protected/medical_records.rs - medical record handlers

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::MedicalRecord;
use crate::middleware::{ApiResponse, ApiResult, Json};

/// GET /api/users/:userID/pets/:petID/medicalRecords
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
) -> ApiResult<Vec<MedicalRecord>> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let records = state.medical_records.list(&user_id, &pet_id).await?;
    Ok(ApiResponse::success(records))
}

/// POST /api/users/:userID/pets/:petID/medicalRecords
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Json(record): Json<MedicalRecord>,
) -> ApiResult<MedicalRecord> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let record = state.medical_records.create(&user_id, &pet_id, record).await?;
    Ok(ApiResponse::created(record))
}

/// GET /api/users/:userID/pets/:petID/medicalRecords/:recordID
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, record_id)): Path<(String, String, String)>,
) -> ApiResult<MedicalRecord> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let record = state.medical_records.get(&user_id, &pet_id, &record_id).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/users/:userID/pets/:petID/medicalRecords/:recordID - full replace
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, record_id)): Path<(String, String, String)>,
    Json(record): Json<MedicalRecord>,
) -> ApiResult<MedicalRecord> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let record = state
        .medical_records
        .update(&user_id, &pet_id, &record_id, record)
        .await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/users/:userID/pets/:petID/medicalRecords/:recordID
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, record_id)): Path<(String, String, String)>,
) -> ApiResult<String> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    state
        .medical_records
        .delete(&user_id, &pet_id, &record_id)
        .await?;
    Ok(ApiResponse::message("Medical record deleted successfully"))
}
