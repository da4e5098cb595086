use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::Role;

/// Represents a user session.
///
/// The role is a snapshot taken at login; admin-only routes re-read it from
/// the database on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the user this session belongs to.
    pub user_id: i32,
    /// The user's role when the session was established.
    pub role: Role,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Starts a session for `user_id` lasting `ttl_hours`.
    pub fn start(user_id: i32, role: Role, ttl_hours: i64) -> Self {
        let created_at = Utc::now();
        Self {
            user_id,
            role,
            created_at,
            expires_at: created_at + chrono::Duration::hours(ttl_hours),
        }
    }

    /// Whether the session has passed its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
