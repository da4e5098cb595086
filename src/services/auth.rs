use crate::crypto::password;
use crate::error::{AppError, Result};
use crate::models::user::{Role, User};
use crate::repositories::user as user_repo;
use crate::state::AppState;
use crate::validation::auth::{LoginRequest, RegisterRequest};

/// Message shared by every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registers a regular user.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The registration payload.
///
/// # Returns
///
/// A `Result` containing the created `User`.
pub async fn register(state: &AppState, request: RegisterRequest) -> Result<User> {
    request.check()?;

    let email = request.email.trim().to_string();
    let name = request.name.trim().to_string();
    tracing::debug!("🔐 Registering user: {}", email);

    if user_repo::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let hashed_password = password::hash_password(request.password).await?;
    let user = user_repo::create_user(&state.db, &email, &hashed_password, &name, Role::User).await?;

    tracing::info!("✅ User created with ID: {}", user.id);
    Ok(user)
}

/// Authenticates a user by email and password.
///
/// Unknown emails and wrong passwords fail identically.
pub async fn authenticate(state: &AppState, request: LoginRequest) -> Result<User> {
    request.check()?;

    let email = request.email.trim();
    tracing::debug!("🔐 Authenticating user: {}", email);

    let user = user_repo::find_by_email(&state.db, email).await?;
    let stored_hash = user.as_ref().map(|u| u.password.clone());

    let verified = password::verify_password(request.password, stored_hash).await?;

    match user {
        Some(user) if verified => {
            tracing::info!("✅ User authenticated: {}", user.id);
            Ok(user)
        }
        _ => Err(AppError::Authentication(INVALID_CREDENTIALS.to_string())),
    }
}

/// Loads the account behind a session, `None` if it has since been removed.
pub async fn current_user(state: &AppState, user_id: i32) -> Result<Option<User>> {
    user_repo::find_by_id(&state.db, user_id).await
}
