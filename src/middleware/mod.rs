//! Middleware components
//!
//! This module contains middleware for:
//! - Authentication (JWT)
//! - Rate limiting
//! - Security and cache-control headers

pub mod auth;
pub mod rate_limit;
pub mod security_headers;

pub use auth::{auth_middleware, AuthError, AuthUser, Claims};
pub use rate_limit::{rate_limit_middleware, LimitQuota, RateLimitState};
pub use security_headers::{api_cache_control_middleware, security_headers_middleware};
