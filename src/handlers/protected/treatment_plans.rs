// handlers/protected/treatment_plans.rs - treatment plan handlers

use axum::extract::{Path, State};
use serde::Deserialize;

use super::params::parse_enum;
use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{PlanStatus, TreatmentPlan};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Json, Query};

type PlanPath = Path<(String, String, String)>;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressRequest {
    pub progress: Option<i64>,
}

/// GET /api/users/:userID/pets/:petID/treatmentPlans?status=ACTIVE
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<TreatmentPlan>> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;

    let status = params
        .status
        .as_deref()
        .map(|raw| parse_enum::<PlanStatus>("status", raw))
        .transpose()?;
    let plans = state.plans.list(&user_id, &pet_id, status).await?;
    Ok(ApiResponse::success(plans))
}

/// POST /api/users/:userID/pets/:petID/treatmentPlans - starts ACTIVE at 0% unless told otherwise
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Json(plan): Json<TreatmentPlan>,
) -> ApiResult<TreatmentPlan> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let plan = state.plans.create(&user_id, &pet_id, plan).await?;
    Ok(ApiResponse::created(plan))
}

/// GET /api/users/:userID/pets/:petID/treatmentPlans/:planID
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, plan_id)): PlanPath,
) -> ApiResult<TreatmentPlan> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let plan = state.plans.get(&user_id, &pet_id, &plan_id).await?;
    state.ownership.scoped(&plan, &user_id, &pet_id)?;
    Ok(ApiResponse::success(plan))
}

/// PUT /api/users/:userID/pets/:petID/treatmentPlans/:planID - merges the supplied fields
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, plan_id)): PlanPath,
    Json(plan): Json<TreatmentPlan>,
) -> ApiResult<TreatmentPlan> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let existing = state.plans.get(&user_id, &pet_id, &plan_id).await?;
    state.ownership.scoped(&existing, &user_id, &pet_id)?;

    let plan = state.plans.update(&user_id, &pet_id, &plan_id, plan).await?;
    Ok(ApiResponse::success(plan))
}

/**
 * PATCH /api/users/:userID/pets/:petID/treatmentPlans/:planID/progress
 *
 * Expected Input:
 * ```json
 * { "progress": 40 }
 * ```
 *
 * Missing or out-of-range values are refused with 400 and nothing is written.
 */
pub async fn update_progress(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, plan_id)): PlanPath,
    Json(body): Json<ProgressRequest>,
) -> ApiResult<TreatmentPlan> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let existing = state.plans.get(&user_id, &pet_id, &plan_id).await?;
    state.ownership.scoped(&existing, &user_id, &pet_id)?;

    let progress = body
        .progress
        .ok_or_else(|| ApiError::field_error("progress", "progress is required"))?;

    let plan = state
        .plans
        .update_progress(&user_id, &pet_id, &plan_id, progress)
        .await?;
    Ok(ApiResponse::success(plan))
}

/// DELETE /api/users/:userID/pets/:petID/treatmentPlans/:planID
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, plan_id)): PlanPath,
) -> ApiResult<String> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let existing = state.plans.get(&user_id, &pet_id, &plan_id).await?;
    state.ownership.scoped(&existing, &user_id, &pet_id)?;

    state.plans.delete(&user_id, &pet_id, &plan_id).await?;
    Ok(ApiResponse::message("Treatment plan deleted successfully"))
}
