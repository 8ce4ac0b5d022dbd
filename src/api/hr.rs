//! HR API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    middleware::auth::AuthUser,
    models::{
        AssignmentRequest, CreateHrRequest, CreateVolunteerRequest, JobApplicantView, JobCard,
        VolunteerApplicationView, VolunteerDetailView,
    },
    services::HrService,
    utils::error::AppResult,
    AppState,
};

/// Staff bootstrap, reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/hr", post(create_hr))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/volunteers", post(create_volunteer).get(list_volunteers))
        .route(
            "/volunteers/{volunteer_id}",
            get(get_volunteer).put(update_volunteer),
        )
        .route(
            "/volunteers/{volunteer_id}/applications",
            get(volunteer_applications),
        )
        .route("/jobs", get(list_jobs))
        .route("/jobs/{job_id}/applications", get(job_applications))
        .route("/assignments", post(assign))
}

#[derive(Debug, Serialize)]
struct HrCreatedResponse {
    message: &'static str,
    hr_id: i64,
}

#[derive(Debug, Serialize)]
struct VolunteerCreatedResponse {
    message: &'static str,
    user_id: i64,
    volunteer_id: i64,
}

#[derive(Debug, Serialize)]
struct VolunteerUpdatedResponse {
    message: &'static str,
    volunteer_id: i64,
}

#[derive(Debug, Serialize)]
struct AssignmentResponse {
    message: &'static str,
    application_id: i64,
}

/// POST /api/hr/hr
async fn create_hr(
    State(state): State<AppState>,
    Json(payload): Json<CreateHrRequest>,
) -> AppResult<(StatusCode, Json<HrCreatedResponse>)> {
    let hr_id = HrService::new(&state.db, &state.config.auth)
        .create_hr(payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(HrCreatedResponse {
            message: "HR user created successfully",
            hr_id,
        }),
    ))
}

/// POST /api/hr/volunteers
async fn create_volunteer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateVolunteerRequest>,
) -> AppResult<(StatusCode, Json<VolunteerCreatedResponse>)> {
    let created = HrService::new(&state.db, &state.config.auth)
        .create_volunteer(&auth_user, payload, &state.config.avatars)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(VolunteerCreatedResponse {
            message: "Volunteer created successfully",
            user_id: created.user_id,
            volunteer_id: created.volunteer_id,
        }),
    ))
}

/// GET /api/hr/volunteers
async fn list_volunteers(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<VolunteerDetailView>>> {
    let volunteers = HrService::new(&state.db, &state.config.auth)
        .list_volunteers(&auth_user)
        .await?;
    Ok(Json(volunteers))
}

/// GET /api/hr/volunteers/{volunteer_id}
async fn get_volunteer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(volunteer_id): Path<i64>,
) -> AppResult<Json<VolunteerDetailView>> {
    let volunteer = HrService::new(&state.db, &state.config.auth)
        .get_volunteer(&auth_user, volunteer_id)
        .await?;
    Ok(Json(volunteer))
}

/// PUT /api/hr/volunteers/{volunteer_id}
async fn update_volunteer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(volunteer_id): Path<i64>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<Json<VolunteerUpdatedResponse>> {
    HrService::new(&state.db, &state.config.auth)
        .update_volunteer(&auth_user, volunteer_id, &payload)
        .await?;
    Ok(Json(VolunteerUpdatedResponse {
        message: "Volunteer updated successfully",
        volunteer_id,
    }))
}

/// GET /api/hr/volunteers/{volunteer_id}/applications
async fn volunteer_applications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(volunteer_id): Path<i64>,
) -> AppResult<Json<Vec<VolunteerApplicationView>>> {
    let applications = HrService::new(&state.db, &state.config.auth)
        .volunteer_applications(&auth_user, volunteer_id)
        .await?;
    Ok(Json(applications))
}

/// GET /api/hr/jobs
async fn list_jobs(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<JobCard>>> {
    let jobs = HrService::new(&state.db, &state.config.auth)
        .list_jobs(&auth_user)
        .await?;
    Ok(Json(jobs))
}

/// GET /api/hr/jobs/{job_id}/applications
async fn job_applications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(job_id): Path<i64>,
) -> AppResult<Json<Vec<JobApplicantView>>> {
    let applications = HrService::new(&state.db, &state.config.auth)
        .job_applications(&auth_user, job_id)
        .await?;
    Ok(Json(applications))
}

/// POST /api/hr/assignments
async fn assign(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<AssignmentRequest>,
) -> AppResult<Json<AssignmentResponse>> {
    let application_id = HrService::new(&state.db, &state.config.auth)
        .assign(&auth_user, &payload)
        .await?;
    Ok(Json(AssignmentResponse {
        message: "Volunteer assigned successfully",
        application_id,
    }))
}
