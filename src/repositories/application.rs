use deadpool_postgres::Pool;
use crate::{
    error::Result,
    models::application::{ApplicationDetails, NewApplication},
};

/// Inserts an application and returns its id.
pub async fn create_application(pool: &Pool, application: &NewApplication) -> Result<i32> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO applications
                (job_id, user_id, name, email, phone, cover_letter, resume_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
            &[
                &application.job_id,
                &application.user_id,
                &application.name,
                &application.email,
                &application.phone,
                &application.cover_letter,
                &application.resume_path,
            ],
        )
        .await?;
    Ok(row.try_get("id")?)
}

/// Lists every application with its job and applicant account, newest first.
pub async fn list_with_details(pool: &Pool) -> Result<Vec<ApplicationDetails>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT
                a.id, a.job_id, a.user_id, a.name, a.email, a.phone,
                a.cover_letter, a.resume_path, a.created_at,
                j.title AS job_title, j.company,
                u.name AS user_name, u.email AS user_email
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            LEFT JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC, a.id DESC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(ApplicationDetails::try_from).collect()
}
