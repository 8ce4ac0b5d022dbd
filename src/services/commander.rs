//! Commander operations: job postings, the application pipeline, interviews

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    db::{
        ApplicationRepository, CommanderRepository, InterviewRepository, JobRepository,
        ResumeRepository, VolunteerRepository,
    },
    middleware::auth::AuthUser,
    models::{
        ApplicantView, ApplicationStatus, ApplicationStatusView, Commander, CreateJobRequest,
        Interview, InterviewChanges, InterviewInvitationRequest, InterviewInvitationResponse,
        InterviewResultsRequest, InterviewStatus, InterviewView, Job, JobApplication, JobCard,
        JobChanges, JobQuestion, JobStatus, NewInterview, QuestionUpsert, Role,
        ScheduleInterviewRequest, VolunteerDetailView,
    },
    services::{
        calendar::{CalendarClient, EventTime, InterviewInvitation},
        export,
        storage::{content_type_for, ResumeStorage},
    },
    utils::{
        dates::parse_iso_datetime,
        error::{AppError, AppResult},
    },
};

/// Resume file ready to be streamed
#[derive(Debug, Clone)]
pub struct ResumeDownload {
    pub path: PathBuf,
    pub filename: String,
    pub content_type: &'static str,
}

/// CSV export ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

/// How a job owned by someone else is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForeignJob {
    Forbidden,
    NotFound,
}

/// Parse a patch body into job column changes; keys are case-insensitive
pub fn parse_job_changes(payload: &Map<String, Value>) -> AppResult<JobChanges> {
    let mut changes = JobChanges::default();

    for (key, value) in payload {
        match key.to_lowercase().as_str() {
            "name" => {
                let title = text(key, value)?.filter(|t| !t.trim().is_empty());
                changes.title =
                    Some(title.ok_or_else(|| AppError::bad_request("name cannot be empty"))?);
            }
            "description" => changes.description = Some(text(key, value)?),
            "positions" => {
                let positions = value
                    .as_i64()
                    .filter(|p| *p >= 0)
                    .ok_or_else(|| AppError::bad_request("positions must be a non-negative integer"))?;
                changes.vacant_positions = Some(positions);
            }
            "category" => changes.category = Some(text(key, value)?),
            "unit" => changes.unit = Some(text(key, value)?),
            "address" => changes.address = Some(text(key, value)?),
            "openbase" => {
                changes.is_open_base = Some(
                    value
                        .as_bool()
                        .ok_or_else(|| AppError::bad_request("openBase must be a boolean"))?,
                );
            }
            "additionalinfo" => changes.additional_info = Some(text(key, value)?),
            "workexperience" => changes.experience = Some(text(key, value)?),
            "education" => changes.education = Some(text(key, value)?),
            "passedcourses" => changes.passed_courses = Some(text(key, value)?),
            "techskills" => changes.tech_skills = Some(text(key, value)?),
            "status" => {
                let raw = value.as_str().unwrap_or_default();
                changes.status = Some(raw.parse().map_err(AppError::BadRequest)?);
            }
            "questions" => {
                let questions: Vec<QuestionUpsert> = serde_json::from_value(value.clone())?;
                changes.questions = Some(questions);
            }
            _ => {}
        }
    }

    Ok(changes)
}

fn text(key: &str, value: &Value) -> AppResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(AppError::bad_request(format!("{} must be a string", key))),
    }
}

/// Parse the camelCase interview payload used by the commander UI
pub fn parse_interview_changes(payload: &Map<String, Value>) -> AppResult<InterviewChanges> {
    let mut changes = InterviewChanges::default();

    if let Some(value) = payload.get("interviewNotes") {
        changes.general_info = Some(text("interviewNotes", value)?);
    }
    if let Some(value) = payload.get("interviewDate") {
        changes.scheduled_date = Some(match text("interviewDate", value)? {
            Some(raw) if !raw.trim().is_empty() => Some(parse_iso_datetime(&raw).ok_or_else(|| {
                AppError::bad_request("Invalid date format. Use ISO 8601 format (YYYY-MM-DDTHH:MM:SS).")
            })?),
            _ => None,
        });
    }
    if let Some(value) = payload.get("automaticMessage") {
        changes.schedule = Some(text("automaticMessage", value)?);
    }
    if let Some(value) = payload.get("status") {
        if let Some(raw) = text("status", value)? {
            changes.status = Some(raw.parse().map_err(AppError::BadRequest)?);
        }
    }

    Ok(changes)
}

/// Commander operations
pub struct CommanderService<'a> {
    pool: &'a SqlitePool,
    storage: &'a ResumeStorage,
}

impl<'a> CommanderService<'a> {
    pub fn new(pool: &'a SqlitePool, storage: &'a ResumeStorage) -> Self {
        Self { pool, storage }
    }

    /// Commander profile of the caller
    async fn commander(&self, auth_user: &AuthUser) -> AppResult<Commander> {
        auth_user.require_role(Role::Commander)?;
        CommanderRepository::new(self.pool)
            .get_by_user(auth_user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Commander profile not found"))
    }

    async fn job_of(&self, commander: &Commander, job_id: i64, foreign: ForeignJob) -> AppResult<Job> {
        let job = JobRepository::new(self.pool)
            .get_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::not_found("Job not found"))?;
        if job.commander_id != commander.id {
            warn!(job_id = job_id, commander_id = commander.id, "Access to foreign job refused");
            return Err(match foreign {
                ForeignJob::Forbidden => {
                    AppError::forbidden("You don't have permission to manage this job")
                }
                ForeignJob::NotFound => AppError::not_found("Job not found"),
            });
        }
        Ok(job)
    }

    async fn application_of(
        &self,
        commander: &Commander,
        job_id: i64,
        volunteer_id: i64,
    ) -> AppResult<JobApplication> {
        self.job_of(commander, job_id, ForeignJob::Forbidden).await?;
        ApplicationRepository::new(self.pool)
            .find(job_id, volunteer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Job application not found"))
    }

    /// Application by id, checked against the caller's jobs
    async fn owned_application(
        &self,
        commander: &Commander,
        application_id: i64,
    ) -> AppResult<JobApplication> {
        let application = ApplicationRepository::new(self.pool)
            .get(application_id)
            .await?
            .ok_or_else(|| AppError::not_found("Application not found"))?;
        self.job_of(commander, application.job_id, ForeignJob::Forbidden)
            .await?;
        Ok(application)
    }

    /// Book the interview on the shared calendar
    pub async fn send_interview_invitation(
        &self,
        auth_user: &AuthUser,
        calendar: Option<&CalendarClient>,
        request: InterviewInvitationRequest,
    ) -> AppResult<InterviewInvitationResponse> {
        auth_user.require_role(Role::Commander)?;

        let (Some(candidate_email), Some(commander_email), Some(job_title), Some(interview_time)) = (
            request.candidate_email,
            request.commander_email,
            request.job_title,
            request.interview_time,
        ) else {
            return Err(AppError::bad_request("Missing required fields"));
        };

        let start = EventTime::parse(&interview_time).ok_or_else(|| {
            AppError::bad_request("Invalid interview time format. Use ISO 8601 format")
        })?;

        let calendar = calendar.ok_or_else(|| {
            AppError::ServiceUnavailable("Calendar integration is not configured".to_string())
        })?;

        let invitation = InterviewInvitation {
            candidate_email,
            commander_email,
            job_title,
            start,
            commander_name: request.commander_name,
            candidate_name: request.candidate_name,
            additional_info: request.additional_info,
            include_meet_link: request.include_meet_link.unwrap_or(true),
        };
        let event = calendar.create_interview_event(&invitation).await?;

        Ok(InterviewInvitationResponse {
            message: "Interview scheduled successfully".to_string(),
            event_link: event.event_link,
            meeting_link: event.meeting_link,
            scheduled_time: start.to_iso(),
        })
    }

    /// Create a job posting with its screening questions
    pub async fn create_job(&self, auth_user: &AuthUser, request: CreateJobRequest) -> AppResult<i64> {
        let commander = self.commander(auth_user).await?;
        request.validate()?;

        let mut tx = self.pool.begin().await?;
        let job_id = JobRepository::insert(&mut tx, commander.id, &request).await?;
        for question in &request.questions {
            JobRepository::insert_question(
                &mut tx,
                job_id,
                &question.question_text,
                question.answer_text.as_deref(),
            )
            .await?;
        }
        tx.commit().await?;

        info!(job_id = job_id, commander_id = commander.id, "Job created");
        Ok(job_id)
    }

    /// The caller's job postings
    pub async fn list_jobs(&self, auth_user: &AuthUser) -> AppResult<Vec<JobCard>> {
        let commander = self.commander(auth_user).await?;
        let repo = JobRepository::new(self.pool);
        let summaries = repo.list_summaries_by_commander(commander.id).await?;
        let ids: Vec<i64> = summaries.iter().map(|s| s.job.id).collect();
        let mut questions = repo.questions_for_jobs(&ids).await?;

        Ok(summaries
            .into_iter()
            .map(|summary| {
                let job_questions = questions.remove(&summary.job.id).unwrap_or_default();
                JobCard::with_questions(summary, job_questions)
            })
            .collect())
    }

    /// Patch a job, synchronising its questions when supplied
    pub async fn patch_job(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        payload: &Map<String, Value>,
    ) -> AppResult<JobCard> {
        let commander = self.commander(auth_user).await?;
        self.job_of(&commander, job_id, ForeignJob::Forbidden).await?;
        let changes = parse_job_changes(payload)?;

        let mut tx = self.pool.begin().await?;
        JobRepository::update(&mut tx, job_id, &changes).await?;

        if let Some(upserts) = &changes.questions {
            let mut existing: HashMap<i64, JobQuestion> = JobRepository::questions_in(&mut tx, job_id)
                .await?
                .into_iter()
                .map(|q| (q.id, q))
                .collect();

            for upsert in upserts {
                match upsert.id.and_then(|id| existing.remove(&id)) {
                    Some(mut question) => {
                        if let Some(text) = &upsert.question_text {
                            question.question_text = text.clone();
                        }
                        if upsert.answer_text.is_some() {
                            question.answer_text = upsert.answer_text.clone();
                        }
                        JobRepository::update_question(&mut tx, &question).await?;
                    }
                    None => {
                        let text = upsert
                            .question_text
                            .as_deref()
                            .filter(|t| !t.trim().is_empty())
                            .ok_or_else(|| AppError::bad_request("question_text is required"))?;
                        JobRepository::insert_question(
                            &mut tx,
                            job_id,
                            text,
                            upsert.answer_text.as_deref(),
                        )
                        .await?;
                    }
                }
            }

            for stale in existing.into_keys() {
                JobRepository::delete_question(&mut tx, stale).await?;
            }
        }

        tx.commit().await?;
        info!(job_id = job_id, "Job updated");

        let repo = JobRepository::new(self.pool);
        let summary = repo
            .get_summary(job_id)
            .await?
            .ok_or_else(|| AppError::not_found("Job not found"))?;
        let questions = repo.questions(job_id).await?;
        Ok(JobCard::with_questions(summary, questions))
    }

    pub async fn job_applicants(&self, auth_user: &AuthUser, job_id: i64) -> AppResult<Vec<ApplicantView>> {
        let commander = self.commander(auth_user).await?;
        self.job_of(&commander, job_id, ForeignJob::NotFound).await?;
        Ok(ApplicationRepository::new(self.pool)
            .list_applicants(job_id)
            .await?)
    }

    /// Move a volunteer's application to `job_id` to a new status
    pub async fn set_application_status(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        volunteer_id: i64,
        status: Option<&str>,
    ) -> AppResult<ApplicationStatusView> {
        let commander = self.commander(auth_user).await?;
        let status = parse_status(status)?;
        let mut application = self.application_of(&commander, job_id, volunteer_id).await?;

        ApplicationRepository::new(self.pool)
            .update_status(application.id, status)
            .await?;
        info!(application_id = application.id, status = %status, "Application status changed");

        application.status = status;
        Ok(ApplicationStatusView::from(&application))
    }

    /// Same as `set_application_status`, addressed by application id
    pub async fn update_application_status(
        &self,
        auth_user: &AuthUser,
        application_id: i64,
        status: Option<&str>,
    ) -> AppResult<()> {
        let commander = self.commander(auth_user).await?;
        let status = parse_status(status)?;
        let application = self.owned_application(&commander, application_id).await?;

        ApplicationRepository::new(self.pool)
            .update_status(application.id, status)
            .await?;
        info!(application_id = application.id, status = %status, "Application status changed");
        Ok(())
    }

    pub async fn create_interview(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        volunteer_id: i64,
        payload: &Map<String, Value>,
    ) -> AppResult<InterviewView> {
        let commander = self.commander(auth_user).await?;
        let application = self.application_of(&commander, job_id, volunteer_id).await?;
        let changes = parse_interview_changes(payload)?;

        let interview = self
            .insert_interview(NewInterview {
                application_id: application.id,
                scheduled_date: changes.scheduled_date.flatten(),
                general_info: changes.general_info.flatten(),
                schedule: changes.schedule.flatten(),
                status: changes.status.unwrap_or_default(),
            })
            .await?;

        Ok(InterviewView::new(job_id, volunteer_id, &interview))
    }

    pub async fn get_interview(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        volunteer_id: i64,
    ) -> AppResult<InterviewView> {
        let commander = self.commander(auth_user).await?;
        let application = self.application_of(&commander, job_id, volunteer_id).await?;
        let interview = self.interview_for(application.id).await?;
        Ok(InterviewView::new(job_id, volunteer_id, &interview).with_application_id(application.id))
    }

    pub async fn patch_interview(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        volunteer_id: i64,
        payload: &Map<String, Value>,
    ) -> AppResult<InterviewView> {
        let commander = self.commander(auth_user).await?;
        let application = self.application_of(&commander, job_id, volunteer_id).await?;
        let interview = self.interview_for(application.id).await?;
        let changes = parse_interview_changes(payload)?;

        let updated = InterviewRepository::new(self.pool)
            .update(interview.id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("Interview not found"))?;
        Ok(InterviewView::new(job_id, volunteer_id, &updated))
    }

    pub async fn delete_interview(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        volunteer_id: i64,
    ) -> AppResult<()> {
        let commander = self.commander(auth_user).await?;
        let application = self.application_of(&commander, job_id, volunteer_id).await?;
        let interview = self.interview_for(application.id).await?;

        InterviewRepository::new(self.pool).delete(interview.id).await?;
        info!(interview_id = interview.id, "Interview deleted");
        Ok(())
    }

    /// Schedule an interview for an application by id
    pub async fn schedule_interview(
        &self,
        auth_user: &AuthUser,
        application_id: i64,
        request: ScheduleInterviewRequest,
    ) -> AppResult<i64> {
        let commander = self.commander(auth_user).await?;
        let application = self.owned_application(&commander, application_id).await?;
        let scheduled_date = parse_iso_datetime(&request.scheduled_date).ok_or_else(|| {
            AppError::bad_request("Invalid date format. Use ISO 8601 format (YYYY-MM-DDTHH:MM:SS).")
        })?;

        let interview = self
            .insert_interview(NewInterview {
                application_id: application.id,
                scheduled_date: Some(scheduled_date),
                general_info: None,
                schedule: request.schedule,
                status: InterviewStatus::Scheduled,
            })
            .await?;
        Ok(interview.id)
    }

    /// Record the outcome of an interview and mark it completed
    pub async fn record_interview_results(
        &self,
        auth_user: &AuthUser,
        interview_id: i64,
        results: &InterviewResultsRequest,
    ) -> AppResult<()> {
        let commander = self.commander(auth_user).await?;
        let interviews = InterviewRepository::new(self.pool);
        let interview = interviews
            .get(interview_id)
            .await?
            .ok_or_else(|| AppError::not_found("Interview not found"))?;
        self.owned_application(&commander, interview.application_id)
            .await?;

        interviews.record_results(interview_id, results).await?;
        info!(interview_id = interview_id, "Interview results recorded");
        Ok(())
    }

    /// Volunteer details, visible only once they applied to one of the caller's jobs
    pub async fn view_volunteer(
        &self,
        auth_user: &AuthUser,
        volunteer_id: i64,
    ) -> AppResult<VolunteerDetailView> {
        let commander = self.commander(auth_user).await?;
        let applications = ApplicationRepository::new(self.pool);
        if !applications
            .applied_to_commander(commander.id, volunteer_id)
            .await?
        {
            return Err(AppError::not_found(
                "Volunteer has not applied to any of your jobs",
            ));
        }

        let profile = VolunteerRepository::new(self.pool)
            .get_profile(volunteer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Volunteer not found"))?;
        let statuses = applications.job_statuses(volunteer_id).await?;
        Ok(VolunteerDetailView::new(&profile, statuses))
    }

    /// Locate the resume of a volunteer's application to `job_id`
    pub async fn resume_download(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        volunteer_id: i64,
    ) -> AppResult<ResumeDownload> {
        let commander = self.commander(auth_user).await?;
        self.job_of(&commander, job_id, ForeignJob::Forbidden).await?;
        let application = ApplicationRepository::new(self.pool)
            .find(job_id, volunteer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Application not found"))?;
        let resume = ResumeRepository::new(self.pool)
            .get_by_application(application.id)
            .await?
            .ok_or_else(|| AppError::not_found("Resume not found for this application"))?;

        let path = self
            .storage
            .resolve(&resume.file_path)
            .filter(|p| p.is_file())
            .ok_or_else(|| AppError::not_found("File not found on server"))?;

        Ok(ResumeDownload {
            path,
            content_type: content_type_for(&resume.original_filename),
            filename: resume.original_filename,
        })
    }

    /// Applications of one of the caller's jobs as CSV
    pub async fn export_applications(&self, auth_user: &AuthUser, job_id: i64) -> AppResult<CsvExport> {
        let commander = self.commander(auth_user).await?;
        self.job_of(&commander, job_id, ForeignJob::Forbidden).await?;

        let rows = ApplicationRepository::new(self.pool)
            .export_rows(job_id)
            .await?;
        if rows.is_empty() {
            return Err(AppError::not_found("No applications found"));
        }

        Ok(CsvExport {
            filename: export::export_filename(job_id),
            body: export::applications_csv(&rows),
        })
    }

    async fn interview_for(&self, application_id: i64) -> AppResult<Interview> {
        InterviewRepository::new(self.pool)
            .get_by_application(application_id)
            .await?
            .ok_or_else(|| AppError::not_found("Interview not found"))
    }

    async fn insert_interview(&self, interview: NewInterview) -> AppResult<Interview> {
        let interviews = InterviewRepository::new(self.pool);
        if interviews
            .get_by_application(interview.application_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "An interview already exists for this application",
            ));
        }
        let created = interviews.create(&interview).await?;
        info!(
            interview_id = created.id,
            application_id = created.application_id,
            "Interview scheduled"
        );
        Ok(created)
    }
}

fn parse_status(status: Option<&str>) -> AppResult<ApplicationStatus> {
    let raw = status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing 'status' field in request data."))?;
    raw.parse().map_err(AppError::BadRequest)
}
