//! Commander API endpoints
//!
//! Job postings, the application pipeline, interviews, resume downloads and
//! the CSV export. Every handler requires the commander role.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::io::ReaderStream;

use crate::{
    middleware::auth::AuthUser,
    models::{
        ApplicantView, ApplicationStatusView, CreateJobRequest, InterviewInvitationRequest,
        InterviewInvitationResponse, InterviewResultsRequest, InterviewView, JobCard,
        ScheduleInterviewRequest, StatusUpdateRequest, VolunteerDetailView,
    },
    services::CommanderService,
    utils::error::{AppError, AppResult},
    AppState,
};

use super::MessageResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/send-interview-invitation", post(send_interview_invitation))
        .route("/jobs", post(create_job).get(list_jobs))
        .route("/jobs/{job_id}", patch(patch_job))
        .route("/jobs/{job_id}/applications", get(job_applications))
        .route("/jobs/{job_id}/applications/export", get(export_applications))
        .route(
            "/jobs/{job_id}/volunteers/{volunteer_id}",
            patch(set_application_status),
        )
        .route(
            "/jobs/{job_id}/volunteers/{volunteer_id}/interviews",
            post(create_interview)
                .get(get_interview)
                .patch(patch_interview)
                .delete(delete_interview),
        )
        .route(
            "/jobs/{job_id}/volunteers/{volunteer_id}/resume",
            get(download_resume),
        )
        .route("/volunteers/{volunteer_id}", get(view_volunteer))
        .route(
            "/applications/{application_id}/status",
            put(update_application_status),
        )
        .route(
            "/applications/{application_id}/interview",
            post(schedule_interview),
        )
        .route("/interviews/{interview_id}/results", put(record_results))
}

#[derive(Debug, Serialize)]
struct JobCreatedResponse {
    message: &'static str,
    job_id: i64,
}

#[derive(Debug, Serialize)]
struct JobUpdatedResponse {
    message: &'static str,
    job: JobCard,
}

#[derive(Debug, Serialize)]
struct ApplicationUpdatedResponse {
    message: &'static str,
    application: ApplicationStatusView,
}

#[derive(Debug, Serialize)]
struct InterviewCreatedResponse {
    message: &'static str,
    interview: InterviewView,
}

#[derive(Debug, Serialize)]
struct InterviewScheduledResponse {
    message: &'static str,
    interview_id: i64,
}

fn service(state: &AppState) -> CommanderService<'_> {
    CommanderService::new(&state.db, &state.storage)
}

/// POST /api/commander/send-interview-invitation
async fn send_interview_invitation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<InterviewInvitationRequest>,
) -> AppResult<(StatusCode, Json<InterviewInvitationResponse>)> {
    let response = service(&state)
        .send_interview_invitation(&auth_user, state.calendar.as_deref(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/commander/jobs
async fn create_job(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateJobRequest>,
) -> AppResult<(StatusCode, Json<JobCreatedResponse>)> {
    let job_id = service(&state).create_job(&auth_user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobCreatedResponse {
            message: "Job created successfully",
            job_id,
        }),
    ))
}

/// GET /api/commander/jobs
async fn list_jobs(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<JobCard>>> {
    Ok(Json(service(&state).list_jobs(&auth_user).await?))
}

/// PATCH /api/commander/jobs/{job_id}
async fn patch_job(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(job_id): Path<i64>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<Json<JobUpdatedResponse>> {
    let job = service(&state)
        .patch_job(&auth_user, job_id, &payload)
        .await?;
    Ok(Json(JobUpdatedResponse {
        message: "Job updated successfully",
        job,
    }))
}

/// GET /api/commander/jobs/{job_id}/applications
async fn job_applications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(job_id): Path<i64>,
) -> AppResult<Json<Vec<ApplicantView>>> {
    Ok(Json(service(&state).job_applicants(&auth_user, job_id).await?))
}

/// PATCH /api/commander/jobs/{job_id}/volunteers/{volunteer_id}
async fn set_application_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((job_id, volunteer_id)): Path<(i64, i64)>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<ApplicationUpdatedResponse>> {
    let application = service(&state)
        .set_application_status(&auth_user, job_id, volunteer_id, payload.status.as_deref())
        .await?;
    Ok(Json(ApplicationUpdatedResponse {
        message: "Job application status updated successfully",
        application,
    }))
}

/// POST /api/commander/jobs/{job_id}/volunteers/{volunteer_id}/interviews
async fn create_interview(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((job_id, volunteer_id)): Path<(i64, i64)>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<InterviewCreatedResponse>)> {
    let interview = service(&state)
        .create_interview(&auth_user, job_id, volunteer_id, &payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(InterviewCreatedResponse {
            message: "Interview created successfully",
            interview,
        }),
    ))
}

/// GET /api/commander/jobs/{job_id}/volunteers/{volunteer_id}/interviews
async fn get_interview(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((job_id, volunteer_id)): Path<(i64, i64)>,
) -> AppResult<Json<InterviewView>> {
    let interview = service(&state)
        .get_interview(&auth_user, job_id, volunteer_id)
        .await?;
    Ok(Json(interview))
}

/// PATCH /api/commander/jobs/{job_id}/volunteers/{volunteer_id}/interviews
async fn patch_interview(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((job_id, volunteer_id)): Path<(i64, i64)>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<Json<InterviewView>> {
    let interview = service(&state)
        .patch_interview(&auth_user, job_id, volunteer_id, &payload)
        .await?;
    Ok(Json(interview))
}

/// DELETE /api/commander/jobs/{job_id}/volunteers/{volunteer_id}/interviews
async fn delete_interview(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((job_id, volunteer_id)): Path<(i64, i64)>,
) -> AppResult<Json<MessageResponse>> {
    service(&state)
        .delete_interview(&auth_user, job_id, volunteer_id)
        .await?;
    Ok(Json(MessageResponse::new("Interview deleted successfully")))
}

/// GET /api/commander/volunteers/{volunteer_id}
async fn view_volunteer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(volunteer_id): Path<i64>,
) -> AppResult<Json<VolunteerDetailView>> {
    Ok(Json(
        service(&state)
            .view_volunteer(&auth_user, volunteer_id)
            .await?,
    ))
}

/// PUT /api/commander/applications/{application_id}/status
async fn update_application_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(application_id): Path<i64>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<MessageResponse>> {
    service(&state)
        .update_application_status(&auth_user, application_id, payload.status.as_deref())
        .await?;
    Ok(Json(MessageResponse::new("Status updated successfully")))
}

/// POST /api/commander/applications/{application_id}/interview
async fn schedule_interview(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(application_id): Path<i64>,
    Json(payload): Json<ScheduleInterviewRequest>,
) -> AppResult<(StatusCode, Json<InterviewScheduledResponse>)> {
    let interview_id = service(&state)
        .schedule_interview(&auth_user, application_id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(InterviewScheduledResponse {
            message: "Interview scheduled successfully",
            interview_id,
        }),
    ))
}

/// PUT /api/commander/interviews/{interview_id}/results
async fn record_results(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(interview_id): Path<i64>,
    Json(payload): Json<InterviewResultsRequest>,
) -> AppResult<Json<MessageResponse>> {
    service(&state)
        .record_interview_results(&auth_user, interview_id, &payload)
        .await?;
    Ok(Json(MessageResponse::new("Interview results recorded successfully")))
}

/// GET /api/commander/jobs/{job_id}/volunteers/{volunteer_id}/resume
async fn download_resume(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((job_id, volunteer_id)): Path<(i64, i64)>,
) -> AppResult<Response> {
    let resume = service(&state)
        .resume_download(&auth_user, job_id, volunteer_id)
        .await?;

    let file = tokio::fs::File::open(&resume.path)
        .await
        .map_err(|_| AppError::not_found("File not found on server"))?;
    let length = file.metadata().await.map(|m| m.len()).ok();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, resume.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", resume.filename.replace('"', "")),
        );
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
}

/// GET /api/commander/jobs/{job_id}/applications/export
async fn export_applications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(job_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let export = service(&state)
        .export_applications(&auth_user, job_id)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    ))
}
