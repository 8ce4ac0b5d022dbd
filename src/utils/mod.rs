//! Shared utilities

pub mod dates;
pub mod error;
pub mod validation;

pub use error::{AppError, AppResult, ErrorResponse};
