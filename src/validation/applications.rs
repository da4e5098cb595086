use chrono::{DateTime, Utc};
use garde::Validate;

use crate::{
    error::{AppError, Result},
    models::{application::NewApplication, job::Job},
    storage::StoredResume,
    validation::rules::{report_to_error, required},
};

/// Fields of the multipart apply form.
#[derive(Debug, Default, Validate)]
pub struct ApplicationForm {
    #[garde(custom(required))]
    pub name: String,
    #[garde(custom(required))]
    pub email: String,
    #[garde(custom(required))]
    pub phone: String,
    #[garde(custom(required))]
    pub cover_letter: String,
    #[garde(skip)]
    pub resume: Option<StoredResume>,
}

/// Checks a submission against its job at `now`.
///
/// The deadline is checked before the form itself, so a late submission is
/// reported as late even when fields are missing.
pub fn check_submission(
    job: &Job,
    now: DateTime<Utc>,
    user_id: i32,
    form: &ApplicationForm,
) -> Result<NewApplication> {
    if job.is_closed(now) {
        return Err(AppError::Validation(
            "Application deadline has passed".to_string(),
        ));
    }

    form.validate().map_err(report_to_error)?;

    let resume = form
        .resume
        .as_ref()
        .ok_or_else(|| AppError::Validation("Resume file is required".to_string()))?;

    Ok(NewApplication {
        job_id: job.id,
        user_id,
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        cover_letter: form.cover_letter.trim().to_string(),
        resume_path: resume.file_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::path::PathBuf;

    fn job(deadline: DateTime<Utc>) -> Job {
        Job {
            id: 5,
            title: "QA Engineer".to_string(),
            company: "Acme".to_string(),
            description: "desc".to_string(),
            deadline,
            created_at: Utc::now(),
        }
    }

    fn form() -> ApplicationForm {
        ApplicationForm {
            name: " Alice ".to_string(),
            email: "a@x.com".to_string(),
            phone: "555-0100".to_string(),
            cover_letter: "Hire me\n".to_string(),
            resume: Some(StoredResume {
                file_name: "1700000000000-cv.pdf".to_string(),
                path: PathBuf::from("uploads/1700000000000-cv.pdf"),
            }),
        }
    }

    #[test]
    fn open_job_with_complete_form_is_accepted() {
        let now = Utc::now();
        let application = check_submission(&job(now + Duration::days(7)), now, 3, &form()).unwrap();

        assert_eq!(application.job_id, 5);
        assert_eq!(application.user_id, 3);
        assert_eq!(application.name, "Alice");
        assert_eq!(application.cover_letter, "Hire me");
        assert_eq!(application.resume_path, "1700000000000-cv.pdf");
    }

    #[test]
    fn past_deadline_is_rejected() {
        let now = Utc::now();
        match check_submission(&job(now - Duration::seconds(1)), now, 3, &form()) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("deadline")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn deadline_equal_to_now_is_still_open() {
        let now = Utc::now();
        assert!(check_submission(&job(now), now, 3, &form()).is_ok());
    }

    #[test]
    fn missing_phone_is_rejected() {
        let now = Utc::now();
        let mut incomplete = form();
        incomplete.phone = String::new();

        match check_submission(&job(now + Duration::days(1)), now, 3, &incomplete) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("phone"), "{}", msg),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_resume_is_rejected() {
        let now = Utc::now();
        let mut incomplete = form();
        incomplete.resume = None;

        match check_submission(&job(now + Duration::days(1)), now, 3, &incomplete) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("Resume")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
