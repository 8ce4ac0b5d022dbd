//! Volunteer API endpoints

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    middleware::auth::AuthUser,
    models::{ApplyRequest, AvailableJobView, VolunteerAccountView, VolunteerProfileView},
    services::VolunteerService,
    utils::error::{AppError, AppResult},
    AppState,
};

use super::MessageResponse;

/// Multipart field carrying the resume
const RESUME_FIELD: &str = "resume";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/{job_id}/apply", post(apply).delete(withdraw))
        .route("/jobs/{job_id}/resume", post(upload_resume))
        .route("/jobs/{job_id}/check-application", get(check_application))
        .route("/get-profile-details", get(profile_details))
        .route("/{volunteer_id}", patch(update_profile))
}

#[derive(Debug, Serialize)]
struct ResumeUploadResponse {
    message: &'static str,
    resume_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckApplicationResponse {
    already_applied: bool,
}

/// GET /api/volunteer/jobs
async fn list_jobs(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<Vec<AvailableJobView>>> {
    let jobs = VolunteerService::new(&state.db, &state.storage)
        .available_jobs()
        .await?;
    Ok(Json(jobs))
}

/// POST /api/volunteer/jobs/{job_id}/apply
///
/// The body is optional; an empty body applies without answers.
async fn apply(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(job_id): Path<i64>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ApplyRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    VolunteerService::new(&state.db, &state.storage)
        .apply(&auth_user, job_id, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Application submitted successfully")),
    ))
}

/// DELETE /api/volunteer/jobs/{job_id}/apply
async fn withdraw(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(job_id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    VolunteerService::new(&state.db, &state.storage)
        .withdraw(&auth_user, job_id)
        .await?;
    Ok(Json(MessageResponse::new("Application deleted successfully")))
}

/// POST /api/volunteer/jobs/{job_id}/resume
async fn upload_resume(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(job_id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ResumeUploadResponse>)> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let contents = field.bytes().await?;
        upload = Some((filename, contents));
        break;
    }

    let (filename, contents) = upload
        .filter(|(filename, _)| !filename.is_empty())
        .ok_or_else(|| AppError::bad_request("No resume file uploaded"))?;

    let resume_id = VolunteerService::new(&state.db, &state.storage)
        .upload_resume(&auth_user, job_id, &filename, &contents)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResumeUploadResponse {
            message: "Resume uploaded successfully",
            resume_id,
        }),
    ))
}

/// GET /api/volunteer/jobs/{job_id}/check-application
async fn check_application(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(job_id): Path<i64>,
) -> AppResult<Json<CheckApplicationResponse>> {
    let already_applied = VolunteerService::new(&state.db, &state.storage)
        .has_applied(&auth_user, job_id)
        .await?;
    Ok(Json(CheckApplicationResponse { already_applied }))
}

/// GET /api/volunteer/get-profile-details
async fn profile_details(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<VolunteerAccountView>> {
    let profile = VolunteerService::new(&state.db, &state.storage)
        .profile_details(&auth_user)
        .await?;
    Ok(Json(profile))
}

/// PATCH /api/volunteer/{volunteer_id}
async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(volunteer_id): Path<i64>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<Json<VolunteerProfileView>> {
    let profile = VolunteerService::new(&state.db, &state.storage)
        .update_profile(&auth_user, volunteer_id, &payload)
        .await?;
    Ok(Json(profile))
}
