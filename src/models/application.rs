use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;

use crate::error::{AppError, Result};

/// A validated application, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub job_id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: String,
    /// File name of the stored resume inside the upload directory.
    pub resume_path: String,
}

/// An application joined with its job and (if still present) its applicant account.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetails {
    pub id: i32,
    pub job_id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: String,
    pub resume_path: String,
    pub created_at: DateTime<Utc>,
    pub job_title: String,
    pub company: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

fn column<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|_| AppError::MissingData(name.to_string()))
}

impl TryFrom<&Row> for ApplicationDetails {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, "id")?,
            job_id: column(row, "job_id")?,
            user_id: column(row, "user_id")?,
            name: column(row, "name")?,
            email: column(row, "email")?,
            phone: column(row, "phone")?,
            cover_letter: column(row, "cover_letter")?,
            resume_path: column(row, "resume_path")?,
            created_at: column(row, "created_at")?,
            job_title: column(row, "job_title")?,
            company: column(row, "company")?,
            user_name: column(row, "user_name")?,
            user_email: column(row, "user_email")?,
        })
    }
}
