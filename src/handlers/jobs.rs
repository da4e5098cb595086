use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    error::Result,
    extract::JsonBody,
    services::jobs as job_service,
    state::AppState,
    validation::jobs::CreateJobRequest,
};

/// Lists every posting, newest first.
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let jobs = job_service::list_jobs(&state).await?;
    Ok(Json(jobs))
}

/// Returns one posting.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse> {
    let job = job_service::get_job(&state, &job_id).await?;
    Ok(Json(job))
}

/// Posts a new job. Admin only.
pub async fn create_job(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateJobRequest>,
) -> Result<impl IntoResponse> {
    let job = job_service::create_job(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}
