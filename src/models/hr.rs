//! HR staff profile model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// HR staff profile row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrStaff {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// Columns inserted for a new HR profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewHrStaff {
    pub name: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// Body of `POST /api/hr/hr`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHrRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub name: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// Body of `POST /api/hr/volunteers`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVolunteerRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "full_name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "national_id is required"))]
    pub national_id: String,
    pub phone: Option<String>,
}

/// Body of `POST /api/hr/assignments`
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentRequest {
    pub volunteer_id: i64,
    pub job_id: i64,
}
