//! Resume metadata model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resume uploaded for an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: i64,
    pub application_id: i64,
    /// File name relative to the resume directory
    pub file_path: String,
    pub original_filename: String,
    pub upload_date: DateTime<Utc>,
}
