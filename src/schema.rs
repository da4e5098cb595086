//! Idempotent schema bootstrap, run on every startup.
//!
//! Tables are created in dependency order. Deployments whose `applications`
//! table predates the `user_id` column get it added, together with its
//! foreign key. Each step lists the SQLSTATE conditions that mean "already
//! done"; any other database error aborts startup.

use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::error::{AppError, Result};

/// A database condition that marks a step as already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlreadyApplied {
    /// SQLSTATE 42701.
    DuplicateColumn,
    /// SQLSTATE 42710, raised for an existing constraint name.
    DuplicateObject,
}

impl AlreadyApplied {
    fn matches(&self, code: &SqlState) -> bool {
        match self {
            AlreadyApplied::DuplicateColumn => *code == SqlState::DUPLICATE_COLUMN,
            AlreadyApplied::DuplicateObject => *code == SqlState::DUPLICATE_OBJECT,
        }
    }
}

/// When a step should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    Always,
    /// Only when `applications.user_id` does not exist yet.
    MissingApplicationUserId,
}

/// One schema change.
#[derive(Debug)]
pub struct MigrationStep {
    pub name: &'static str,
    sql: &'static str,
    guard: Guard,
    pub tolerated: &'static [AlreadyApplied],
}

impl MigrationStep {
    /// Whether `code` means this step was applied before.
    pub fn tolerates(&self, code: &SqlState) -> bool {
        self.tolerated.iter().any(|condition| condition.matches(code))
    }
}

/// The schema, in the order it must be applied.
pub const MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        name: "create_users",
        sql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                name VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        guard: Guard::Always,
        tolerated: &[],
    },
    MigrationStep {
        name: "create_jobs",
        sql: r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id SERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                company VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                deadline TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        guard: Guard::Always,
        tolerated: &[],
    },
    MigrationStep {
        name: "create_applications",
        sql: r#"
            CREATE TABLE IF NOT EXISTS applications (
                id SERIAL PRIMARY KEY,
                job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
                user_id INTEGER,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                phone VARCHAR(50) NOT NULL,
                cover_letter TEXT NOT NULL,
                resume_path VARCHAR(500) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        guard: Guard::Always,
        tolerated: &[],
    },
    MigrationStep {
        name: "add_applications_user_id",
        sql: "ALTER TABLE applications ADD COLUMN user_id INTEGER",
        guard: Guard::MissingApplicationUserId,
        tolerated: &[AlreadyApplied::DuplicateColumn],
    },
    MigrationStep {
        name: "add_applications_user_fk",
        sql: r#"
            ALTER TABLE applications
            ADD CONSTRAINT applications_user_id_fkey
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL
        "#,
        guard: Guard::Always,
        tolerated: &[AlreadyApplied::DuplicateObject],
    },
];

async fn application_user_id_exists(client: &deadpool_postgres::Client) -> Result<bool> {
    let row = client
        .query_one(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = current_schema()
                  AND table_name = 'applications'
                  AND column_name = 'user_id'
            ) AS present
            "#,
            &[],
        )
        .await?;
    row.try_get("present")
        .map_err(|_| AppError::MissingData("present".to_string()))
}

/// Applies every step of [`MIGRATIONS`].
///
/// Safe to run repeatedly: tables use `IF NOT EXISTS` and the later steps
/// treat their listed conditions as success.
pub async fn bootstrap(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;

    for step in MIGRATIONS {
        if step.guard == Guard::MissingApplicationUserId
            && application_user_id_exists(&client).await?
        {
            tracing::debug!("⏭️ Migration {} not needed", step.name);
            continue;
        }

        match client.batch_execute(step.sql).await {
            Ok(()) => tracing::debug!("✅ Migration {} applied", step.name),
            Err(e) => match e.code() {
                Some(code) if step.tolerates(code) => {
                    tracing::debug!("⏭️ Migration {} already applied ({})", step.name, code.code());
                }
                _ => {
                    tracing::error!("❌ Migration {} failed: {}", step.name, e);
                    return Err(AppError::Database(e));
                }
            },
        }
    }

    tracing::info!("✅ Database schema is up to date");
    Ok(())
}
