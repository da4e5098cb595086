use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    error::{AppError, Result},
    handlers::auth::MessageResponse,
    models::session::Session,
    services::applications::{self as application_service, settle},
    state::AppState,
    storage::ResumeStore,
    validation::applications::ApplicationForm,
};

/// Reads the apply form, streaming the `resume` part to disk.
///
/// If the body turns out malformed after the resume was written, the file is
/// removed before the error is returned.
async fn read_application_form(resumes: &ResumeStore, multipart: Multipart) -> Result<ApplicationForm> {
    let mut form = ApplicationForm::default();
    let outcome = read_fields(resumes, multipart, &mut form).await;
    settle(resumes, form.resume.as_ref(), outcome).await?;
    Ok(form)
}

async fn read_fields(
    resumes: &ResumeStore,
    mut multipart: Multipart,
    form: &mut ApplicationForm,
) -> Result<()> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(format!("Parse error: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "resume" => {
                let original = field.file_name().unwrap_or("").to_string();
                if original.is_empty() {
                    // Browsers send an empty part when no file was chosen.
                    continue;
                }
                if let Some(previous) = form.resume.take() {
                    resumes.discard(&previous).await;
                }
                form.resume = Some(resumes.save_field(&original, field).await?);
            }
            "name" | "email" | "phone" | "coverLetter" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Multipart(format!("{}: {}", field_name, e)))?;
                match field_name.as_str() {
                    "name" => form.name = value,
                    "email" => form.email = value,
                    "phone" => form.phone = value,
                    _ => form.cover_letter = value,
                }
            }
            other => tracing::debug!("Ignoring unexpected form field: {}", other),
        }
    }

    Ok(())
}

/// Submits an application with a resume upload.
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    tracing::info!("📤 Application for job {} from user {}", job_id, session.user_id);

    let form = read_application_form(&state.resumes, multipart).await?;
    application_service::submit(&state, session.user_id, &job_id, form).await?;

    let response = MessageResponse {
        message: "Application submitted successfully".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}
