//! Authentication API endpoints
//!
//! Registration, login and the current account.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};

use crate::{
    middleware::auth::AuthUser,
    models::{CurrentAccountResponse, LoginRequest, LoginResponse},
    services::AuthService,
    utils::error::AppResult,
    AppState,
};

use super::MessageResponse;

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes that need a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    AuthService::new(&state.db, &state.config.auth)
        .register(payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = AuthService::new(&state.db, &state.config.auth)
        .login(&payload)
        .await?;
    Ok(Json(response))
}

/// GET /api/auth/me
async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<CurrentAccountResponse>> {
    let account = AuthService::new(&state.db, &state.config.auth)
        .current_account(&auth_user)
        .await?;
    Ok(Json(account))
}
