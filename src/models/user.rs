//! User account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role; decides which profile table backs the account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Volunteer,
    Commander,
    Hr,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Volunteer => "volunteer",
            Role::Commander => "commander",
            Role::Hr => "hr",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "volunteer" => Ok(Role::Volunteer),
            "commander" => Ok(Role::Commander),
            "hr" => Ok(Role::Hr),
            _ => Err("Invalid Role".to_string()),
        }
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Columns inserted for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

/// Account fields a volunteer may edit on their own profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub full_name: Option<String>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
