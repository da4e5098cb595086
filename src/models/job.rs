use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;

use crate::error::{AppError, Result};

/// A job posting.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Whether applications are no longer accepted at `now`.
    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now
    }
}

impl TryFrom<&Row> for Job {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            title: row.try_get("title").map_err(|_| AppError::MissingData("title".to_string()))?,
            company: row.try_get("company").map_err(|_| AppError::MissingData("company".to_string()))?,
            description: row.try_get("description").map_err(|_| AppError::MissingData("description".to_string()))?,
            deadline: row.try_get("deadline").map_err(|_| AppError::MissingData("deadline".to_string()))?,
            created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        })
    }
}

/// A validated posting, ready to insert.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
}
