use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    models::{session::Session, user::Role},
    repositories::user as user_repo,
    session_store::SessionStore,
    state::AppState,
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Extracts the session token from the request cookies.
pub fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolves the caller's live session, if any.
async fn load_session(state: &AppState, cookies: &Cookies) -> Result<Option<Session>> {
    match extract_session_token(cookies) {
        Some(token) => state.sessions.get(&token).await,
        None => {
            tracing::debug!("No session_id cookie found");
            Ok(None)
        }
    }
}

fn not_authenticated() -> AppError {
    AppError::Authentication("Not authenticated".to_string())
}

/// A middleware that requires a valid session to be present.
///
/// The session is handed to the handler as an `Extension<Session>`.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    tracing::debug!("🔐 Checking authentication...");

    let session = load_session(&state, &cookies)
        .await?
        .ok_or_else(not_authenticated)?;

    tracing::debug!("✅ User authenticated: {}", session.user_id);

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Decides an admin request from the caller's current `role`.
///
/// A session whose user no longer exists is destroyed, as `me` does.
async fn authorize_admin(
    sessions: &SessionStore,
    token: &str,
    session: &Session,
    role: Option<Role>,
) -> Result<()> {
    match role {
        Some(Role::Admin) => Ok(()),
        Some(Role::User) => {
            tracing::warn!("❌ User {} is not an admin", session.user_id);
            Err(AppError::Forbidden)
        }
        None => {
            tracing::warn!("❌ Session refers to missing user: {}", session.user_id);
            sessions.destroy(token).await?;
            Err(not_authenticated())
        }
    }
}

/// A middleware that requires a session whose user is currently an admin.
///
/// The role is read from the database on every request, not from the session.
pub async fn require_admin(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = extract_session_token(&cookies).ok_or_else(not_authenticated)?;
    let session = state
        .sessions
        .get(&token)
        .await?
        .ok_or_else(not_authenticated)?;

    let role = user_repo::find_role(&state.db, session.user_id).await?;
    authorize_admin(&state.sessions, &token, &session, role).await?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn stored_session(sessions: &SessionStore, token: &str, role: Role) -> Session {
        let session = Session::start(7, role, 24);
        sessions.put(token, &session, 86400).await.unwrap();
        session
    }

    #[tokio::test]
    async fn admins_pass() {
        let sessions = SessionStore::memory();
        let session = stored_session(&sessions, "admin-tok", Role::Admin).await;

        authorize_admin(&sessions, "admin-tok", &session, Some(Role::Admin))
            .await
            .unwrap();
        assert!(sessions.get("admin-tok").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn demoted_users_are_forbidden_but_stay_signed_in() {
        let sessions = SessionStore::memory();
        let session = stored_session(&sessions, "user-tok", Role::Admin).await;

        let result = authorize_admin(&sessions, "user-tok", &session, Some(Role::User)).await;

        assert!(matches!(result, Err(AppError::Forbidden)));
        assert!(sessions.get("user-tok").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sessions_of_deleted_users_are_destroyed() {
        let sessions = SessionStore::memory();
        let session = stored_session(&sessions, "gone-tok", Role::Admin).await;

        let result = authorize_admin(&sessions, "gone-tok", &session, None).await;

        match result {
            Err(AppError::Authentication(msg)) => assert_eq!(msg, "Not authenticated"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(sessions.get("gone-tok").await.unwrap().is_none());
    }
}
