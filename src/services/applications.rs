use chrono::Utc;

use crate::{
    error::{AppError, Result},
    models::application::ApplicationDetails,
    repositories::{application as application_repo, job as job_repo},
    services::jobs::job_not_found,
    state::AppState,
    storage::{ResumeStore, StoredResume},
    validation::{
        applications::{check_submission, ApplicationForm},
        jobs::parse_job_id,
    },
};

/// Submits an application for `raw_job_id` on behalf of `user_id`.
///
/// The resume is already on disk when this runs. Disk and database are not
/// transactional with each other, so any failure here, validation or insert,
/// removes the stored resume before the error is returned.
pub async fn submit(
    state: &AppState,
    user_id: i32,
    raw_job_id: &str,
    form: ApplicationForm,
) -> Result<i32> {
    let outcome = accept(state, user_id, raw_job_id, &form).await;
    settle(&state.resumes, form.resume.as_ref(), outcome).await
}

async fn accept(
    state: &AppState,
    user_id: i32,
    raw_job_id: &str,
    form: &ApplicationForm,
) -> Result<i32> {
    let job_id = parse_job_id(raw_job_id)
        .ok_or_else(|| AppError::Validation("Invalid job id".to_string()))?;

    let job = job_repo::find_by_id(&state.db, job_id)
        .await?
        .ok_or_else(job_not_found)?;

    let application = check_submission(&job, Utc::now(), user_id, form)?;
    let application_id = application_repo::create_application(&state.db, &application).await?;

    tracing::info!(
        "✅ Application {} submitted by user {} for job {}",
        application_id,
        user_id,
        job_id
    );
    Ok(application_id)
}

/// Removes `resume` when `outcome` is an error; the error itself is returned unchanged.
pub async fn settle<T>(
    resumes: &ResumeStore,
    resume: Option<&StoredResume>,
    outcome: Result<T>,
) -> Result<T> {
    if outcome.is_err() {
        if let Some(resume) = resume {
            resumes.discard(resume).await;
        }
    }
    outcome
}

/// Lists all applications for the admin view.
pub async fn list_applications(state: &AppState) -> Result<Vec<ApplicationDetails>> {
    application_repo::list_with_details(&state.db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::Job;
    use chrono::Duration;

    async fn stored(store: &ResumeStore, name: &str) -> StoredResume {
        let path = store.root().join(name);
        tokio::fs::write(&path, b"resume").await.unwrap();
        StoredResume {
            file_name: name.to_string(),
            path,
        }
    }

    #[tokio::test]
    async fn failure_removes_the_resume_and_keeps_the_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::init(dir.path()).await.unwrap();
        let resume = stored(&store, "1-cv.pdf").await;

        let outcome: Result<i32> = Err(AppError::Validation("phone is required".to_string()));
        let settled = settle(&store, Some(&resume), outcome).await;

        assert!(matches!(settled, Err(AppError::Validation(ref m)) if m == "phone is required"));
        assert!(!resume.path.exists());
    }

    #[tokio::test]
    async fn success_keeps_the_resume() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::init(dir.path()).await.unwrap();
        let resume = stored(&store, "2-cv.pdf").await;

        let settled = settle(&store, Some(&resume), Ok(11)).await.unwrap();

        assert_eq!(settled, 11);
        assert!(resume.path.exists());
    }

    #[tokio::test]
    async fn persistence_failure_also_removes_the_resume() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::init(dir.path()).await.unwrap();
        let resume = stored(&store, "3-cv.pdf").await;

        let outcome: Result<i32> = Err(AppError::Internal("insert failed".to_string()));
        assert!(settle(&store, Some(&resume), outcome).await.is_err());
        assert!(!resume.path.exists());
    }

    #[tokio::test]
    async fn missing_phone_is_rejected_and_the_resume_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::init(dir.path()).await.unwrap();
        let resume = stored(&store, "4-cv.pdf").await;

        let now = Utc::now();
        let job = Job {
            id: 8,
            title: "QA Engineer".to_string(),
            company: "Acme".to_string(),
            description: "desc".to_string(),
            deadline: now + Duration::days(7),
            created_at: now,
        };
        let form = ApplicationForm {
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            phone: String::new(),
            cover_letter: "Hello".to_string(),
            resume: Some(resume.clone()),
        };

        let outcome = check_submission(&job, now, 3, &form).map(|_| ());
        let settled = settle(&store, form.resume.as_ref(), outcome).await;

        match settled {
            Err(AppError::Validation(msg)) => assert!(msg.contains("phone"), "{}", msg),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!resume.path.exists());
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 0);
    }
}
