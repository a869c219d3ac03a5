// handlers/protected/scheduled_tasks.rs - scheduled task handlers

use axum::extract::{Path, State};
use serde::Deserialize;

use super::params::{parse_day, parse_enum, parse_range};
use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{ScheduledTask, TaskStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Json, Query};

type TaskPath = Path<(String, String, String)>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}

/**
 * GET /api/users/:userID/pets/:petID/scheduledTasks
 *
 * `?date=YYYY-MM-DD` lists that UTC day, `?startDate=&endDate=` a closed range,
 * and no parameters lists every task with a schedule time. Results are ordered
 * by `scheduledDateTime` ascending.
 */
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<ScheduledTask>> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;

    let tasks = if let Some(date) = params.date.as_deref() {
        let day = parse_day("date", date)?;
        state.tasks.list_by_date(&user_id, &pet_id, day).await?
    } else if params.start_date.is_some() || params.end_date.is_some() {
        let (start, end) = parse_range(params.start_date.as_deref(), params.end_date.as_deref())?;
        state.tasks.list_by_range(&user_id, &pet_id, start, end).await?
    } else {
        state.tasks.list_all(&user_id, &pet_id).await?
    };

    Ok(ApiResponse::success(tasks))
}

/// POST /api/users/:userID/pets/:petID/scheduledTasks
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Json(task): Json<ScheduledTask>,
) -> ApiResult<ScheduledTask> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let task = state.tasks.create(&user_id, &pet_id, task).await?;
    Ok(ApiResponse::created(task))
}

/// GET /api/users/:userID/pets/:petID/scheduledTasks/upcoming?limit=5
pub async fn upcoming(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id)): Path<(String, String)>,
    Query(params): Query<UpcomingParams>,
) -> ApiResult<Vec<ScheduledTask>> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let limit = params
        .limit
        .unwrap_or(state.config.timeline.upcoming_limit);
    let tasks = state
        .tasks
        .list_upcoming(&user_id, &pet_id, limit, chrono::Utc::now())
        .await?;
    Ok(ApiResponse::success(tasks))
}

/// GET /api/users/:userID/pets/:petID/scheduledTasks/:taskID
pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, task_id)): TaskPath,
) -> ApiResult<ScheduledTask> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let task = state.tasks.get(&user_id, &pet_id, &task_id).await?;
    state.ownership.scoped(&task, &user_id, &pet_id)?;
    Ok(ApiResponse::success(task))
}

/// PUT /api/users/:userID/pets/:petID/scheduledTasks/:taskID - merges the supplied fields
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, task_id)): TaskPath,
    Json(task): Json<ScheduledTask>,
) -> ApiResult<ScheduledTask> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let existing = state.tasks.get(&user_id, &pet_id, &task_id).await?;
    state.ownership.scoped(&existing, &user_id, &pet_id)?;

    let task = state.tasks.update(&user_id, &pet_id, &task_id, task).await?;
    Ok(ApiResponse::success(task))
}

/// PATCH /api/users/:userID/pets/:petID/scheduledTasks/:taskID/status?status=COMPLETED
pub async fn update_status(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, task_id)): TaskPath,
    Query(params): Query<StatusParams>,
) -> ApiResult<ScheduledTask> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let existing = state.tasks.get(&user_id, &pet_id, &task_id).await?;
    state.ownership.scoped(&existing, &user_id, &pet_id)?;

    let raw = params
        .status
        .ok_or_else(|| ApiError::field_error("status", "status is required"))?;
    let status: TaskStatus = parse_enum("status", &raw)?;

    let task = state
        .tasks
        .update_status(&user_id, &pet_id, &task_id, status)
        .await?;
    Ok(ApiResponse::success(task))
}

/// DELETE /api/users/:userID/pets/:petID/scheduledTasks/:taskID
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, pet_id, task_id)): TaskPath,
) -> ApiResult<String> {
    state.ownership.pet(&principal, &user_id, &pet_id).await?;
    let existing = state.tasks.get(&user_id, &pet_id, &task_id).await?;
    state.ownership.scoped(&existing, &user_id, &pet_id)?;

    state.tasks.delete(&user_id, &pet_id, &task_id).await?;
    Ok(ApiResponse::message("Scheduled task deleted successfully"))
}
