use axum::Json;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::routing::{get, patch, post};
use axum::{Router, extract::State, http::StatusCode};

use crate::error::AppError;
use crate::models::*;
use crate::services::{StatsService, TaskService};
use crate::state::AppState;

/// Caller identity forwarded by the web front end. Authentication happens
/// upstream; this layer only transports the id.
pub struct OwnerId(pub String);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| OwnerId(value.to_string()))
            .ok_or_else(|| AppError::Validation("missing X-User-Id header".to_string()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", patch(edit_task).delete(delete_task))
        .route("/tasks/{id}/toggle", post(toggle_task))
        .route("/stats/priority", get(priority_stats))
        .route("/stats/weekly", get(weekly_stats))
        .route("/stats/completion", get(completion_stats))
        .route("/stats/summary", get(summary_stats))
        .route("/stats/urgency", get(urgency_stats))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_tasks(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, AppError> {
    let service = TaskService::new(state.db.clone());
    let tasks = service.list(&owner, filter).await?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Json(req): Json<NewTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let service = TaskService::new(state.db.clone());
    let task = service.create(&owner, req).await?;
    Ok(Json(task))
}

async fn edit_task(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let service = TaskService::new(state.db.clone());
    let task = service.edit(&owner, &id, req).await?;
    Ok(Json(task))
}

async fn toggle_task(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let service = TaskService::new(state.db.clone());
    let task = service.toggle_complete(&owner, &id).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let service = TaskService::new(state.db.clone());
    service.delete(&owner, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn priority_stats(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> Result<Json<PriorityBreakdown>, AppError> {
    let service = StatsService::new(state.db.clone());
    let breakdown = service.priority_breakdown(&owner).await?;
    Ok(Json(breakdown))
}

async fn weekly_stats(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> Result<Json<WeeklyCompletions>, AppError> {
    let service = StatsService::new(state.db.clone());
    let weekly = service.weekly_completions(&owner).await?;
    Ok(Json(weekly))
}

async fn completion_stats(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> Result<Json<Vec<MonthlyBucket>>, AppError> {
    let service = StatsService::new(state.db.clone());
    let buckets = service.monthly_completion(&owner).await?;
    Ok(Json(buckets))
}

async fn summary_stats(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> Result<Json<TaskSummary>, AppError> {
    let service = StatsService::new(state.db.clone());
    let summary = service.summary(&owner).await?;
    Ok(Json(summary))
}

async fn urgency_stats(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
) -> Result<Json<UrgencyHistogram>, AppError> {
    let service = StatsService::new(state.db.clone());
    let histogram = service.urgency_histogram(&owner).await?;
    Ok(Json(histogram))
}
