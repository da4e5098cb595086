use deadpool_postgres::Pool;
use crate::config::Config;
use crate::crypto::password;
use crate::error::{AppError, Result};
use crate::session_store::SessionStore;
use crate::storage::ResumeStore;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// Server-side sessions.
    pub sessions: SessionStore,
    /// Uploaded resumes.
    pub resumes: ResumeStore,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        let sessions = match &config.redis_url {
            Some(url) => SessionStore::redis(url).await?,
            None => {
                tracing::warn!("⚠️ REDIS_URL not set, sessions are kept in memory");
                SessionStore::memory()
            }
        };
        tracing::info!("✅ Session store initialized ({})", sessions.backend());

        let dummy_ready = tokio::task::spawn_blocking(password::prime_dummy_hash)
            .await
            .map_err(|e| AppError::Internal(format!("Dummy hash task failed: {}", e)))?;
        if !dummy_ready {
            tracing::warn!("⚠️ Dummy password hash unavailable, unknown-email logins skip hashing");
        }

        let resumes = ResumeStore::init(&config.upload_dir).await?;
        tracing::info!("✅ Resume storage ready at {}", config.upload_dir.display());

        Ok(AppState {
            db,
            sessions,
            resumes,
            config: config.clone(),
        })
    }
}
