use crate::{
    error::{AppError, Result},
    models::job::Job,
    repositories::job as job_repo,
    state::AppState,
    validation::jobs::{parse_job_id, CreateJobRequest},
};

/// Lists all postings, newest first.
pub async fn list_jobs(state: &AppState) -> Result<Vec<Job>> {
    job_repo::list_jobs(&state.db).await
}

/// Fetches one posting. Ids that cannot name a job are simply not found.
pub async fn get_job(state: &AppState, raw_id: &str) -> Result<Job> {
    let job_id = parse_job_id(raw_id).ok_or_else(job_not_found)?;

    job_repo::find_by_id(&state.db, job_id)
        .await?
        .ok_or_else(job_not_found)
}

/// Validates and stores a new posting.
pub async fn create_job(state: &AppState, request: CreateJobRequest) -> Result<Job> {
    let new_job = request.into_new_job()?;
    let job = job_repo::create_job(&state.db, &new_job).await?;

    tracing::info!("✅ Job posted: {} ({} at {})", job.id, job.title, job.company);
    Ok(job)
}

pub fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}
