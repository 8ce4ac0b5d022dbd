//! Commander profile model

use serde::{Deserialize, Serialize};

/// Commander profile row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commander {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub rank: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// Columns inserted for a new commander profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCommander {
    pub name: String,
    pub rank: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}
