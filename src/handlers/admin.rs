use axum::{extract::State, response::IntoResponse, Json};

use crate::{error::Result, services::applications as application_service, state::AppState};

/// Lists all submitted applications with job and applicant details.
pub async fn list_applications(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let applications = application_service::list_applications(&state).await?;
    tracing::debug!("📋 Listing {} applications", applications.len());
    Ok(Json(applications))
}
