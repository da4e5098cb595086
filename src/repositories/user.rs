use deadpool_postgres::Pool;
use tokio_postgres::{Row, error::SqlState};
use crate::{
    error::{AppError, Result},
    models::user::{Role, User},
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    let role: String = row.try_get("role").map_err(|_| AppError::MissingData("role".to_string()))?;

    Ok(User {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        password: row.try_get("password").map_err(|_| AppError::MissingData("password".to_string()))?,
        name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
        role: role.parse().map_err(AppError::Internal)?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// Creates a new user in the database.
///
/// A taken email is reported as `AppError::Conflict`, including when another
/// request inserts the same email concurrently.
pub async fn create_user(
    pool: &Pool,
    email: &str,
    password_hash: &str,
    name: &str,
    role: Role,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (email, password, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password, name, role, created_at
            "#,
            &[&email, &password_hash, &name, &role.as_str()],
        )
        .await
        .map_err(|e| match e.code() {
            Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
                AppError::Conflict("Email already registered".to_string())
            }
            _ => AppError::from(e),
        })?;
    row_to_user(&row)
}

/// Finds a user by their email address.
pub async fn find_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password, name, role, created_at
            FROM users
            WHERE email = $1
            "#,
            &[&email],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: i32) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password, name, role, created_at
            FROM users
            WHERE id = $1
            "#,
            &[&user_id],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Reads only the current role of a user, `None` if the user is gone.
pub async fn find_role(pool: &Pool, user_id: i32) -> Result<Option<Role>> {
    let client = pool.get().await?;
    let row = client
        .query_opt("SELECT role FROM users WHERE id = $1", &[&user_id])
        .await?;

    row.map(|r| {
        let role: String = r.try_get("role").map_err(|_| AppError::MissingData("role".to_string()))?;
        role.parse().map_err(AppError::Internal)
    })
    .transpose()
}

/// Whether at least one admin account exists.
pub async fn admin_exists(pool: &Pool) -> Result<bool> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM users WHERE role = 'admin') AS present",
            &[],
        )
        .await?;
    row.try_get("present").map_err(|_| AppError::MissingData("present".to_string()))
}
