// handlers/protected/wellness_timeline.rs - GET .../wellnessTimeline

use axum::extract::{Path, State};
use serde::Deserialize;

use super::params::parse_range;
use crate::app::AppState;
use crate::auth::Principal;
use crate::middleware::{ApiResponse, ApiResult, Query};
use crate::services::WellnessTimeline;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/**
 * GET /api/users/:userID/pets/:petID/wellnessTimeline?startDate=&endDate=
 *
 * Both bounds are required. Returns tasks, medical records and treatment plans
 * inside the range, the next pending tasks, and today's completion counts.
 */
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Query(params): Query<TimelineParams>,
) -> ApiResult<WellnessTimeline> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;

    let (start, end) = parse_range(params.start_date.as_deref(), params.end_date.as_deref())?;
    let timeline = state.timeline.build(&user_id, &pet_id, start, end).await?;
    Ok(ApiResponse::success(timeline))
}
