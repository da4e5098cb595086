use garde::Validate;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::job::NewJob,
    validation::rules::{parse_deadline, report_to_error, required, valid_deadline},
};

/// The request payload for posting a job.
#[derive(Deserialize, Debug, Validate)]
pub struct CreateJobRequest {
    #[serde(default)]
    #[garde(custom(required))]
    pub title: String,
    #[serde(default)]
    #[garde(custom(required))]
    pub company: String,
    #[serde(default)]
    #[garde(custom(required))]
    pub description: String,
    #[serde(default)]
    #[garde(custom(required), custom(valid_deadline))]
    pub deadline: String,
}

impl CreateJobRequest {
    /// Validates the payload and produces the trimmed, normalized posting.
    pub fn into_new_job(self) -> Result<NewJob> {
        self.validate().map_err(report_to_error)?;

        let deadline = parse_deadline(&self.deadline)
            .ok_or_else(|| AppError::Validation("deadline is not a valid date".to_string()))?;

        Ok(NewJob {
            title: self.title.trim().to_string(),
            company: self.company.trim().to_string(),
            description: self.description.trim().to_string(),
            deadline,
        })
    }
}

/// Parses a job id path segment; only positive integers are ids.
pub fn parse_job_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|id| *id > 0)
}
