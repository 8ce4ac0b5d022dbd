//! Authentication request and response models

use serde::{Deserialize, Serialize};

use super::{Role, User, VolunteerAccountView};

/// Login request body; both fields are checked by the handler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account summary for commanders and HR staff
#[derive(Debug, Clone, Serialize)]
pub struct StaffAccountView {
    pub id: i64,
    pub full_name: Option<String>,
    pub email: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl From<&User> for StaffAccountView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
        }
    }
}

/// `user` object returned at login, shaped by role
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AccountView {
    Volunteer(VolunteerAccountView),
    Staff(StaffAccountView),
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountView>,
}

/// Current account, as returned by `GET /api/auth/me`
#[derive(Debug, Clone, Serialize)]
pub struct CurrentAccountResponse {
    pub role: Role,
    pub user: Option<AccountView>,
}

/// Volunteer profile fields accepted at registration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolunteerRegistration {
    pub full_name: String,
    pub national_id: String,
    pub join_date: Option<String>,
    pub address: Option<String>,
    pub primary_profession: Option<String>,
    pub education: Option<String>,
    pub area_of_interest: Option<String>,
    pub contact_reference: Option<String>,
    pub profile: Option<i64>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub experience: Option<String>,
    pub courses: Option<String>,
    pub languages: Option<String>,
    pub interests: Option<String>,
    pub personal_summary: Option<String>,
}
