use deadpool_postgres::Pool;
use crate::{
    error::{AppError, Result},
    models::job::{Job, NewJob},
};

/// Lists all jobs, newest first.
pub async fn list_jobs(pool: &Pool) -> Result<Vec<Job>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, title, company, description, deadline, created_at
            FROM jobs
            ORDER BY created_at DESC, id DESC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(Job::try_from).collect()
}

/// Finds a job by its ID.
pub async fn find_by_id(pool: &Pool, job_id: i32) -> Result<Option<Job>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, title, company, description, deadline, created_at
            FROM jobs
            WHERE id = $1
            "#,
            &[&job_id],
        )
        .await?;
    row.as_ref().map(Job::try_from).transpose()
}

/// Inserts a job and returns it with its generated id and timestamp.
pub async fn create_job(pool: &Pool, job: &NewJob) -> Result<Job> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO jobs (title, company, description, deadline)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, company, description, deadline, created_at
            "#,
            &[&job.title, &job.company, &job.description, &job.deadline],
        )
        .await?;
    Job::try_from(&row)
}

/// Counts stored postings.
pub async fn count_jobs(pool: &Pool) -> Result<i64> {
    let client = pool.get().await?;
    let row = client.query_one("SELECT COUNT(*) AS total FROM jobs", &[]).await?;
    row.try_get("total").map_err(|_| AppError::MissingData("total".to_string()))
}
