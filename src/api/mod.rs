//! API routes and handlers
//!
//! Everything is served under `/api`. Registration, login, the HR bootstrap
//! endpoint and the health probes are public; the rest needs a bearer token.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::{
    middleware::{
        self,
        rate_limit::{spawn_rate_limit_cleanup, LimitQuota, RateLimitState},
    },
    AppState,
};

mod auth;
mod commander;
mod health;
mod hr;
mod volunteer;

pub use health::*;

/// Multipart framing allowance on top of the resume size limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Body of responses that only carry a message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Authentication routes (no token required)
pub fn auth_routes() -> Router<AppState> {
    Router::new().nest("/auth", auth::public_routes())
}

/// Other public routes
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/hr", hr::public_routes())
}

/// Routes behind the auth middleware
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::protected_routes())
        .nest("/volunteer", volunteer::routes())
        .nest("/commander", commander::routes())
        .nest("/hr", hr::routes())
}

fn rate_limited(router: Router<AppState>, quota: LimitQuota) -> Router<AppState> {
    let limiter = RateLimitState::new(quota);
    spawn_rate_limit_cleanup(limiter.clone());
    router.layer(axum::middleware::from_fn_with_state(
        limiter,
        middleware::rate_limit_middleware,
    ))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// Build the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let config = &state.config;

    let mut auth = auth_routes();
    let mut public = public_routes();
    let mut protected = protected_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::auth_middleware,
    ));

    // Stricter quota on login and registration
    if config.rate_limit.enabled {
        auth = rate_limited(auth, LimitQuota::auth(&config.rate_limit));
        let api_quota = LimitQuota::api(&config.rate_limit);
        public = rate_limited(public, api_quota);
        protected = rate_limited(protected, api_quota);
    }

    let api = Router::new()
        .merge(auth)
        .merge(public)
        .merge(protected)
        .layer(axum::middleware::from_fn(
            middleware::api_cache_control_middleware,
        ))
        .layer(DefaultBodyLimit::max(
            state.storage.max_bytes() + MULTIPART_OVERHEAD_BYTES,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut router = Router::new().nest("/api", api);

    if let Some(secs) = config.server.request_timeout_secs {
        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(secs),
        ));
    }

    let cors = cors_layer(&config.server.cors_origins);

    router
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
