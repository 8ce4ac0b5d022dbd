//! Job posting models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Job posting status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Open,
    Closed,
}

impl JobStatus {
    /// Stored value, e.g. `open`
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }

    /// Enumeration name, e.g. `OPEN`
    pub fn name(&self) -> &'static str {
        match self {
            JobStatus::Open => "OPEN",
            JobStatus::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(JobStatus::Open),
            "closed" => Ok(JobStatus::Closed),
            _ => Err(format!("Invalid status value: {}", s)),
        }
    }
}

/// Job posting owned by a commander
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub commander_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub vacant_positions: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub required_certificates: Option<String>,
    pub required_languages: Option<String>,
    pub status: JobStatus,
    pub is_open_base: bool,
    pub additional_info: Option<String>,
    pub common_questions: Option<String>,
    pub common_answers: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub passed_courses: Option<String>,
    pub tech_skills: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub address: Option<String>,
    pub position: Option<String>,
}

impl Job {
    /// Whether volunteers may currently apply
    pub fn accepts_applications(&self) -> bool {
        self.is_active && self.status == JobStatus::Open
    }
}

/// Screening question attached to a job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobQuestion {
    pub id: i64,
    pub job_id: i64,
    pub question_text: String,
    pub answer_text: Option<String>,
}

/// Question supplied when creating a job
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewJobQuestion {
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub question_text: String,
    #[serde(default)]
    pub answer_text: Option<String>,
}

/// Request body for creating a job
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0, message = "positions must not be negative"))]
    pub positions: Option<i64>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub address: Option<String>,
    pub open_base: Option<bool>,
    pub additional_info: Option<String>,
    pub work_experience: Option<String>,
    pub education: Option<String>,
    pub passed_courses: Option<String>,
    pub tech_skills: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<NewJobQuestion>,
}

/// Question entry in a job patch; entries without a known `id` are created
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionUpsert {
    pub id: Option<i64>,
    pub question_text: Option<String>,
    pub answer_text: Option<String>,
}

/// Partial update of a job, keyed by column
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub vacant_positions: Option<i64>,
    pub category: Option<Option<String>>,
    pub unit: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub is_open_base: Option<bool>,
    pub additional_info: Option<Option<String>>,
    pub experience: Option<Option<String>>,
    pub education: Option<Option<String>>,
    pub passed_courses: Option<Option<String>>,
    pub tech_skills: Option<Option<String>>,
    pub status: Option<JobStatus>,
    /// Replacement question set; `None` leaves questions untouched
    pub questions: Option<Vec<QuestionUpsert>>,
}

/// Job as listed on the volunteer job board
#[derive(Debug, Clone, Serialize)]
pub struct AvailableJobView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub vacant_positions: i64,
    pub required_certificates: Option<String>,
    pub required_languages: Option<String>,
    pub additional_info: Option<String>,
    pub questions: Vec<JobQuestion>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub passed_courses: Option<String>,
    pub tech_skills: Option<String>,
    pub unit: Option<String>,
    pub status: &'static str,
}

impl AvailableJobView {
    pub fn new(job: Job, questions: Vec<JobQuestion>) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            vacant_positions: job.vacant_positions,
            required_certificates: job.required_certificates,
            required_languages: job.required_languages,
            additional_info: job.additional_info,
            questions,
            experience: job.experience,
            education: job.education,
            passed_courses: job.passed_courses,
            tech_skills: job.tech_skills,
            unit: job.unit,
            status: job.status.name(),
        }
    }
}

/// Job with the owning commander's department and its application count
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub job: Job,
    pub department: Option<String>,
    pub applications_count: i64,
}

/// Job card shown to commanders (with questions) and HR (with common Q&A)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCard {
    pub id: String,
    pub job_name: String,
    pub job_category: Option<String>,
    pub unit: Option<String>,
    pub address: Option<String>,
    pub positions: i64,
    pub open_base: bool,
    pub closed_base: bool,
    pub job_description: Option<String>,
    pub additional_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<JobQuestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_questions: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_answers: Option<Option<String>>,
    pub education: Option<String>,
    pub tech_skills: Option<String>,
    pub work_experience: Option<String>,
    pub passed_courses: Option<String>,
    pub candidate_count: i64,
    pub status: &'static str,
    pub department: Option<String>,
    pub commander_id: i64,
    #[serde(rename = "applications_count")]
    pub applications_count: i64,
}

impl JobCard {
    fn base(summary: JobSummary) -> Self {
        let JobSummary {
            job,
            department,
            applications_count,
        } = summary;
        Self {
            id: job.id.to_string(),
            job_name: job.title,
            job_category: job.category,
            unit: job.unit,
            address: job.address,
            positions: job.vacant_positions,
            open_base: job.is_open_base,
            closed_base: !job.is_open_base,
            job_description: job.description,
            additional_info: job.additional_info,
            questions: None,
            common_questions: None,
            common_answers: None,
            education: job.education,
            tech_skills: job.tech_skills,
            work_experience: job.experience,
            passed_courses: job.passed_courses,
            candidate_count: applications_count,
            status: job.status.name(),
            department,
            commander_id: job.commander_id,
            applications_count,
        }
    }

    /// Commander view, carrying the screening questions
    pub fn with_questions(summary: JobSummary, questions: Vec<JobQuestion>) -> Self {
        let mut card = Self::base(summary);
        card.questions = Some(questions);
        card
    }

    /// HR view, carrying the free-text common questions and answers
    pub fn with_common_qa(summary: JobSummary) -> Self {
        let common_questions = summary.job.common_questions.clone();
        let common_answers = summary.job.common_answers.clone();
        let mut card = Self::base(summary);
        card.common_questions = Some(common_questions);
        card.common_answers = Some(common_answers);
        card
    }
}
