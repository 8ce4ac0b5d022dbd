//! Job application models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an application stands in the hiring pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Preferred,
    Rejected,
    Hired,
    PreferredFinal,
}

impl ApplicationStatus {
    /// Stored value, e.g. `preferred_final`
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Preferred => "preferred",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::PreferredFinal => "preferred_final",
        }
    }

    /// Enumeration name, e.g. `PREFERRED_FINAL`
    pub fn name(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Preferred => "PREFERRED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Hired => "HIRED",
            ApplicationStatus::PreferredFinal => "PREFERRED_FINAL",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    /// Accepts the value or the name form, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "preferred" => Ok(ApplicationStatus::Preferred),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "hired" => Ok(ApplicationStatus::Hired),
            "preferred_final" => Ok(ApplicationStatus::PreferredFinal),
            _ => Err(format!("Invalid status value: {}", s)),
        }
    }
}

/// A volunteer's application to a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: i64,
    pub job_id: i64,
    pub volunteer_id: i64,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
}

/// Answer to one screening question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationAnswer {
    pub id: i64,
    pub application_id: i64,
    pub question_id: i64,
    pub answer_text: String,
}

/// Answer supplied with an application
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerInput {
    pub question_id: i64,
    pub text: String,
}

/// Optional body of an apply request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

/// Applicant row listed to the commander owning the job
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantView {
    pub candidate_user_id: i64,
    pub name: String,
    pub age: Option<i32>,
    pub status: ApplicationStatus,
    pub image_url: Option<String>,
}

/// Application as seen from the volunteer's side
#[derive(Debug, Clone, Serialize)]
pub struct VolunteerApplicationView {
    pub id: i64,
    pub job_title: String,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
}

/// Application as seen from the job's side
#[derive(Debug, Clone, Serialize)]
pub struct JobApplicantView {
    pub id: i64,
    pub volunteer_name: String,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
}

/// One line of the applications export
#[derive(Debug, Clone)]
pub struct ApplicationExportRow {
    pub application_id: i64,
    pub volunteer_name: String,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    pub phone: Option<String>,
    pub email: String,
    pub education: Option<String>,
    pub interview_status: Option<String>,
}

/// Status change payload shared by the commander endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

/// Application reference returned after a status change
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub id: String,
    /// Enumeration name, e.g. `PREFERRED`
    pub status: &'static str,
}

impl From<&JobApplication> for ApplicationStatusView {
    fn from(application: &JobApplication) -> Self {
        Self {
            id: application.id.to_string(),
            status: application.status.name(),
        }
    }
}
