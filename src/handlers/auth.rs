use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::{time::Duration, SameSite};

use crate::{
    crypto::token::generate_session_token,
    error::{AppError, Result},
    extract::JsonBody,
    middleware_layer::auth::{extract_session_token, SESSION_COOKIE},
    models::{
        session::Session,
        user::{PublicUser, User},
    },
    services::auth as auth_service,
    state::AppState,
    validation::auth::{LoginRequest, RegisterRequest},
};

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: PublicUser,
}

/// The response payload for requests that only acknowledge.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Creates the session cookie.
///
/// HttpOnly but not Secure: the service assumes it sits behind plain HTTP or
/// a TLS-terminating proxy.
fn create_session_cookie(value: String, max_age_hours: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::hours(max_age_hours));
    cookie.set_path("/");
    cookie
}

/// Stores a fresh session for `user` and sets its cookie.
async fn start_session(state: &AppState, cookies: &Cookies, user: &User) -> Result<()> {
    let token = generate_session_token();
    let session = Session::start(user.id, user.role, state.config.session_ttl_hours);

    state
        .sessions
        .put(&token, &session, state.config.session_ttl_secs())
        .await?;

    cookies.add(create_session_cookie(token, state.config.session_ttl_hours));
    tracing::info!("✅ Session established for user: {}", user.id);
    Ok(())
}

fn clear_session_cookie(cookies: &Cookies) {
    let mut session_cookie = Cookie::new(SESSION_COOKIE, "");
    session_cookie.set_max_age(Duration::seconds(0));
    session_cookie.set_path("/");
    cookies.remove(session_cookie);
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Response> {
    tracing::info!("📝 Register attempt: {}", payload.email);

    let user = auth_service::register(&state, payload).await?;
    start_session(&state, &cookies, &user).await?;

    let response = AuthResponse {
        message: "Registration successful".to_string(),
        user: PublicUser::from(&user),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt: {}", payload.email);

    let user = auth_service::authenticate(&state, payload).await?;
    start_session(&state, &cookies, &user).await?;

    let response = AuthResponse {
        message: "Login successful".to_string(),
        user: PublicUser::from(&user),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles user logout. Succeeds whether or not a session was present.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response> {
    if let Some(token) = extract_session_token(&cookies) {
        state.sessions.destroy(&token).await.map_err(|e| {
            tracing::error!("❌ Failed to destroy session: {}", e);
            AppError::Internal("Logout failed".to_string())
        })?;
        tracing::info!("✅ Session destroyed");
    }

    clear_session_cookie(&cookies);

    let response = MessageResponse {
        message: "Logout successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the account behind the current session.
///
/// A session whose user no longer exists is destroyed.
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
) -> Result<Response> {
    match auth_service::current_user(&state, session.user_id).await? {
        Some(user) => Ok((StatusCode::OK, Json(PublicUser::from(&user))).into_response()),
        None => {
            tracing::warn!("❌ Session refers to missing user: {}", session.user_id);
            if let Some(token) = extract_session_token(&cookies) {
                state.sessions.destroy(&token).await?;
            }
            clear_session_cookie(&cookies);
            Err(AppError::Authentication("User not found".to_string()))
        }
    }
}
