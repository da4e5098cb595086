use redis::{AsyncCommands, aio::ConnectionManager};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, Result},
    models::session::Session,
};

/// Server-side session table keyed by opaque token.
///
/// Redis is used when configured; otherwise sessions live in process memory
/// and are lost on restart.
#[derive(Clone)]
pub enum SessionStore {
    /// Sessions stored as JSON under `session:<token>` with a TTL.
    Redis(ConnectionManager),
    /// Sessions kept in a local map. Expired entries are dropped on read and
    /// swept on every write.
    Memory(Arc<Mutex<HashMap<String, Session>>>),
}

fn redis_key(token: &str) -> String {
    format!("session:{}", token)
}

impl SessionStore {
    /// Connects to Redis at `url`.
    pub async fn redis(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(SessionStore::Redis(manager))
    }

    /// Creates an empty in-process store.
    pub fn memory() -> Self {
        SessionStore::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    /// Human-readable backend name for startup logs.
    pub fn backend(&self) -> &'static str {
        match self {
            SessionStore::Redis(_) => "redis",
            SessionStore::Memory(_) => "memory",
        }
    }

    /// Stores `session` under `token` for `ttl_secs` seconds.
    pub async fn put(&self, token: &str, session: &Session, ttl_secs: u64) -> Result<()> {
        match self {
            SessionStore::Redis(manager) => {
                let session_json = sonic_rs::to_string(session)
                    .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

                let mut conn = manager.clone();
                let _: () = conn
                    .set_ex(redis_key(token), session_json, ttl_secs)
                    .await
                    .map_err(|e| {
                        tracing::error!("❌ Redis set_ex failed: {}", e);
                        AppError::Redis(e)
                    })?;
            }
            SessionStore::Memory(sessions) => {
                let mut sessions = sessions.lock().await;
                let before = sessions.len();
                sessions.retain(|_, stored| !stored.is_expired());
                if sessions.len() < before {
                    tracing::debug!("🧹 Swept {} expired sessions", before - sessions.len());
                }
                sessions.insert(token.to_string(), session.clone());
            }
        }

        tracing::debug!("✅ Session stored for user: {}", session.user_id);
        Ok(())
    }

    /// Looks up the live session for `token`.
    ///
    /// An expired entry is removed and reported as absent.
    pub async fn get(&self, token: &str) -> Result<Option<Session>> {
        let session = match self {
            SessionStore::Redis(manager) => {
                let mut conn = manager.clone();
                let session_json: Option<String> = conn.get(redis_key(token)).await?;

                match session_json {
                    Some(json) => match sonic_rs::from_str::<Session>(&json) {
                        Ok(session) => Some(session),
                        Err(e) => {
                            tracing::warn!("❌ Invalid session JSON: {}", e);
                            None
                        }
                    },
                    None => None,
                }
            }
            SessionStore::Memory(sessions) => sessions.lock().await.get(token).cloned(),
        };

        match session {
            Some(session) if session.is_expired() => {
                tracing::warn!("❌ Session expired for user: {}", session.user_id);
                self.destroy(token).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Removes the session for `token`, if any.
    pub async fn destroy(&self, token: &str) -> Result<()> {
        match self {
            SessionStore::Redis(manager) => {
                let mut conn = manager.clone();
                let _: () = conn.del(redis_key(token)).await?;
            }
            SessionStore::Memory(sessions) => {
                sessions.lock().await.remove(token);
            }
        }
        Ok(())
    }
}
