use chrono::{Duration, Utc};

use crate::{
    crypto::password,
    error::{AppError, Result},
    models::{job::NewJob, user::Role},
    repositories::{job as job_repo, user as user_repo},
    state::AppState,
};

/// Postings inserted into an empty catalog: title, company, description, days open.
const SAMPLE_JOBS: [(&str, &str, &str, i64); 2] = [
    (
        "Frontend Developer",
        "TechCorp",
        "Build and maintain responsive web interfaces. Experience with modern JavaScript frameworks required.",
        7,
    ),
    (
        "Backend Engineer",
        "DataSystems",
        "Design APIs and data pipelines on PostgreSQL. Experience with distributed systems is a plus.",
        14,
    ),
];

/// Creates the default admin and the sample postings when they are missing.
///
/// Both checks look at what is stored, so running this on every startup is safe.
pub async fn run(state: &AppState) -> Result<()> {
    seed_admin(state).await?;
    seed_jobs(state).await?;
    Ok(())
}

async fn seed_admin(state: &AppState) -> Result<()> {
    if user_repo::admin_exists(&state.db).await? {
        tracing::debug!("Admin account present, skipping admin seed");
        return Ok(());
    }

    let config = &state.config;
    let hashed = password::hash_password(config.admin_password.to_string()).await?;

    match user_repo::create_user(&state.db, &config.admin_email, &hashed, &config.admin_name, Role::Admin).await {
        Ok(admin) => {
            tracing::info!("✅ Default admin created: {} (id {})", admin.email, admin.id);
            Ok(())
        }
        Err(AppError::Conflict(_)) => {
            tracing::warn!(
                "⚠️ {} is already registered as a regular user; no admin was seeded",
                config.admin_email
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn seed_jobs(state: &AppState) -> Result<()> {
    if job_repo::count_jobs(&state.db).await? > 0 {
        tracing::debug!("Jobs present, skipping sample postings");
        return Ok(());
    }

    let now = Utc::now();
    for (title, company, description, days_open) in SAMPLE_JOBS {
        let job = NewJob {
            title: title.to_string(),
            company: company.to_string(),
            description: description.to_string(),
            deadline: now + Duration::days(days_open),
        };
        job_repo::create_job(&state.db, &job).await?;
    }

    tracing::info!("✅ Inserted {} sample job postings", SAMPLE_JOBS.len());
    Ok(())
}
