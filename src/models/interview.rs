//! Interview models

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::dates::format_naive_datetime;

/// Interview lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "completed" => Ok(InterviewStatus::Completed),
            "cancelled" | "canceled" => Ok(InterviewStatus::Cancelled),
            _ => Err(format!("Invalid interview status: {}", s)),
        }
    }
}

/// Interview attached to an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: i64,
    pub application_id: i64,
    /// UTC wall-clock time of the interview
    pub scheduled_date: Option<NaiveDateTime>,
    pub general_info: Option<String>,
    pub schedule: Option<String>,
    pub management_results: Option<String>,
    pub personal_results: Option<String>,
    pub summary: Option<String>,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns inserted for a new interview
#[derive(Debug, Clone, Default)]
pub struct NewInterview {
    pub application_id: i64,
    pub scheduled_date: Option<NaiveDateTime>,
    pub general_info: Option<String>,
    pub schedule: Option<String>,
    pub status: InterviewStatus,
}

/// Partial update of an interview
#[derive(Debug, Clone, Default)]
pub struct InterviewChanges {
    pub scheduled_date: Option<Option<NaiveDateTime>>,
    pub general_info: Option<Option<String>>,
    pub schedule: Option<Option<String>>,
    pub status: Option<InterviewStatus>,
}

/// Interview payload exchanged with the commander UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewView {
    pub candidate_id: String,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<i64>,
    pub interview_notes: Option<String>,
    pub interview_date: Option<String>,
    pub automatic_message: Option<String>,
    pub status: InterviewStatus,
}

impl InterviewView {
    pub fn new(job_id: i64, volunteer_id: i64, interview: &Interview) -> Self {
        Self {
            candidate_id: volunteer_id.to_string(),
            job_id: job_id.to_string(),
            application_id: None,
            interview_notes: interview.general_info.clone(),
            interview_date: interview.scheduled_date.as_ref().map(format_naive_datetime),
            automatic_message: interview.schedule.clone(),
            status: interview.status,
        }
    }

    pub fn with_application_id(mut self, application_id: i64) -> Self {
        self.application_id = Some(application_id);
        self
    }
}

/// Body of `POST /applications/{id}/interview`
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub scheduled_date: String,
    pub schedule: Option<String>,
}

/// Body of `PUT /interviews/{id}/results`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewResultsRequest {
    pub management_results: Option<String>,
    pub personal_results: Option<String>,
    pub summary: Option<String>,
}

/// Body of `POST /api/commander/send-interview-invitation`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewInvitationRequest {
    pub candidate_email: Option<String>,
    pub commander_email: Option<String>,
    pub job_title: Option<String>,
    pub interview_time: Option<String>,
    pub commander_name: Option<String>,
    pub candidate_name: Option<String>,
    pub additional_info: Option<String>,
    pub include_meet_link: Option<bool>,
}

/// Links of the calendar event created for an invitation
#[derive(Debug, Clone, Serialize)]
pub struct InterviewInvitationResponse {
    pub message: String,
    pub event_link: Option<String>,
    pub meeting_link: Option<String>,
    pub scheduled_time: String,
}
