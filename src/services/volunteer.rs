//! Volunteer-facing operations: job board, applications, resumes, profile

use std::collections::HashSet;

use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    db::{
        ApplicationRepository, JobRepository, ResumeRepository, UserRepository,
        VolunteerRepository,
    },
    middleware::auth::AuthUser,
    models::{
        AccountChanges, ApplyRequest, AvailableJobView, Role, VolunteerAccountView,
        VolunteerChanges, VolunteerProfileView, VOLUNTEER_REQUIRED_FIELDS,
        VOLUNTEER_TEXT_FIELDS,
    },
    services::storage::ResumeStorage,
    utils::{
        dates::{parse_birth_date, parse_iso_date},
        error::{AppError, AppResult},
        validation::validate_email,
    },
};

/// Who is editing a volunteer profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileEditor {
    /// The volunteer; unknown keys are rejected and account fields may change
    Owner,
    /// HR staff; only profile columns are applied, other keys are ignored
    Staff,
}

/// Parsed profile update split by table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub volunteer: VolunteerChanges,
    pub account: AccountChanges,
}

/// Turn a JSON patch into column changes
/// Reject a `national_id` change that collides with another volunteer
pub async fn ensure_national_id_free(
    repo: &VolunteerRepository<'_>,
    volunteer_id: i64,
    changes: &VolunteerChanges,
) -> AppResult<()> {
    if let Some(national_id) = changes.text_value("national_id") {
        if repo
            .national_id_taken_by_other(national_id, volunteer_id)
            .await?
        {
            return Err(AppError::conflict("National ID already registered"));
        }
    }
    Ok(())
}

pub fn parse_profile_update(
    payload: &Map<String, Value>,
    editor: ProfileEditor,
) -> AppResult<ProfileUpdate> {
    let mut update = ProfileUpdate::default();

    for (key, value) in payload {
        match key.as_str() {
            column if VOLUNTEER_TEXT_FIELDS.contains(&column) => {
                let text = optional_text(column, value)?;
                if VOLUNTEER_REQUIRED_FIELDS.contains(&column)
                    && text.as_deref().map_or(true, |t| t.trim().is_empty())
                {
                    return Err(AppError::bad_request(format!("{} cannot be empty", column)));
                }
                if column == "full_name" {
                    update.account.full_name = text.clone();
                }
                update.volunteer.set_text(column, text);
            }
            "profile" => {
                update.volunteer.profile = Some(profile_value(value)?);
            }
            "date_of_birth" => {
                let text = optional_text(key, value)?.filter(|t| !t.trim().is_empty());
                match (text, editor) {
                    (None, ProfileEditor::Owner) => {}
                    (None, ProfileEditor::Staff) => update.volunteer.date_of_birth = Some(None),
                    (Some(text), _) => {
                        let parsed = match editor {
                            ProfileEditor::Owner => parse_birth_date(&text),
                            ProfileEditor::Staff => parse_iso_date(&text),
                        };
                        let date = parsed.ok_or_else(|| {
                            AppError::bad_request(
                                "Invalid date format for date_of_birth. Use YYYY-MMM-DD (e.g. 2000-Nov-11) or ISO 8601",
                            )
                        })?;
                        update.volunteer.date_of_birth = Some(Some(date));
                    }
                }
            }
            "gender" => {
                let gender = match optional_text(key, value)?.filter(|t| !t.trim().is_empty()) {
                    Some(text) => Some(text.parse().map_err(AppError::BadRequest)?),
                    None => None,
                };
                update.volunteer.gender = Some(gender);
            }
            "id" => {}
            "email" | "phone" | "image_url" | "imageUrl" if editor == ProfileEditor::Owner => {
                let Some(text) = optional_text(key, value)? else {
                    continue;
                };
                match key.as_str() {
                    "email" => {
                        if !validate_email(&text) {
                            return Err(AppError::bad_request("Invalid email address"));
                        }
                        update.account.email = Some(text);
                    }
                    "phone" => update.account.phone = Some(text),
                    _ => update.account.image_url = Some(text),
                }
            }
            _ if editor == ProfileEditor::Staff => {}
            _ => {
                return Err(AppError::bad_request(format!(
                    "Invalid field to update: {}",
                    key
                )))
            }
        }
    }

    Ok(update)
}

fn optional_text(key: &str, value: &Value) -> AppResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(AppError::bad_request(format!("Invalid value for {}", key))),
    }
}

fn profile_value(value: &Value) -> AppResult<Option<i64>> {
    let invalid = || AppError::bad_request("Invalid profile value (must be an integer)");
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(invalid),
        Value::String(s) => s.trim().parse().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Volunteer-facing operations
pub struct VolunteerService<'a> {
    pool: &'a SqlitePool,
    storage: &'a ResumeStorage,
}

impl<'a> VolunteerService<'a> {
    pub fn new(pool: &'a SqlitePool, storage: &'a ResumeStorage) -> Self {
        Self { pool, storage }
    }

    /// Active open jobs with their screening questions
    pub async fn available_jobs(&self) -> AppResult<Vec<AvailableJobView>> {
        let repo = JobRepository::new(self.pool);
        let jobs = repo.list_active().await?;
        let ids: Vec<i64> = jobs.iter().map(|j| j.id).collect();
        let mut questions = repo.questions_for_jobs(&ids).await?;

        Ok(jobs
            .into_iter()
            .map(|job| {
                let job_questions = questions.remove(&job.id).unwrap_or_default();
                AvailableJobView::new(job, job_questions)
            })
            .collect())
    }

    /// Volunteer profile id of the caller
    async fn volunteer_id(&self, auth_user: &AuthUser) -> AppResult<i64> {
        auth_user.require_role(Role::Volunteer)?;
        VolunteerRepository::new(self.pool)
            .id_for_user(auth_user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Volunteer profile not found"))
    }

    /// Apply to a job, storing the screening answers with the application
    pub async fn apply(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        request: ApplyRequest,
    ) -> AppResult<i64> {
        let volunteer_id = self.volunteer_id(auth_user).await?;

        let mut tx = self.pool.begin().await?;

        let job = JobRepository::get_in(&mut tx, job_id)
            .await?
            .ok_or_else(|| AppError::not_found("Job not found"))?;
        if !job.accepts_applications() {
            return Err(AppError::bad_request("This job is not accepting applications"));
        }
        if ApplicationRepository::find_in(&mut tx, job_id, volunteer_id)
            .await?
            .is_some()
        {
            return Err(AppError::bad_request("You have already applied for this job"));
        }

        let question_ids: HashSet<i64> = JobRepository::questions_in(&mut tx, job_id)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect();
        if let Some(answer) = request
            .answers
            .iter()
            .find(|a| !question_ids.contains(&a.question_id))
        {
            return Err(AppError::bad_request(format!(
                "Question {} does not belong to this job",
                answer.question_id
            )));
        }

        let application_id = ApplicationRepository::insert(&mut tx, job_id, volunteer_id).await?;
        for answer in &request.answers {
            ApplicationRepository::insert_answer(
                &mut tx,
                application_id,
                answer.question_id,
                &answer.text,
            )
            .await?;
        }

        tx.commit().await?;
        info!(
            application_id = application_id,
            job_id = job_id,
            volunteer_id = volunteer_id,
            "Application submitted"
        );

        Ok(application_id)
    }

    /// Withdraw an application along with its interview, answers and resume
    pub async fn withdraw(&self, auth_user: &AuthUser, job_id: i64) -> AppResult<()> {
        let volunteer_id = self.volunteer_id(auth_user).await?;

        let mut tx = self.pool.begin().await?;
        let application = ApplicationRepository::find_in(&mut tx, job_id, volunteer_id)
            .await?
            .ok_or_else(|| AppError::not_found("No application found"))?;
        let resume_file = ResumeRepository::file_path_in(&mut tx, application.id).await?;
        ApplicationRepository::delete(&mut tx, application.id).await?;
        tx.commit().await?;

        if let Some(file) = resume_file {
            if let Err(e) = self.storage.remove(&file).await {
                warn!(error = %e, file = %file, "Failed to remove resume of withdrawn application");
            }
        }

        info!(
            application_id = application.id,
            job_id = job_id,
            "Application withdrawn"
        );
        Ok(())
    }

    pub async fn has_applied(&self, auth_user: &AuthUser, job_id: i64) -> AppResult<bool> {
        let volunteer_id = self.volunteer_id(auth_user).await?;
        Ok(ApplicationRepository::new(self.pool)
            .find(job_id, volunteer_id)
            .await?
            .is_some())
    }

    /// The caller's own profile
    pub async fn profile_details(&self, auth_user: &AuthUser) -> AppResult<VolunteerAccountView> {
        if auth_user.role != Role::Volunteer {
            return Err(AppError::forbidden("User is not a volunteer"));
        }
        let profile = VolunteerRepository::new(self.pool)
            .get_profile_by_user(auth_user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Volunteer profile not found"))?;
        Ok(VolunteerAccountView::new(&profile, "%Y-%m-%d"))
    }

    /// Patch the caller's profile and account fields
    pub async fn update_profile(
        &self,
        auth_user: &AuthUser,
        volunteer_id: i64,
        payload: &Map<String, Value>,
    ) -> AppResult<VolunteerProfileView> {
        let repo = VolunteerRepository::new(self.pool);
        let own_id = repo.id_for_user(auth_user.id).await?;
        if own_id != Some(volunteer_id) {
            return Err(AppError::forbidden("Unauthorized"));
        }

        let update = parse_profile_update(payload, ProfileEditor::Owner)?;
        ensure_national_id_free(&repo, volunteer_id, &update.volunteer).await?;
        if let Some(email) = update.account.email.as_deref() {
            if let Some(existing) = UserRepository::new(self.pool).get_by_email(email).await? {
                if existing.id != auth_user.id {
                    return Err(AppError::conflict("Email already registered"));
                }
            }
        }

        let mut tx = self.pool.begin().await?;
        VolunteerRepository::update(&mut tx, volunteer_id, &update.volunteer).await?;
        UserRepository::update_account(&mut tx, auth_user.id, &update.account).await?;
        tx.commit().await?;

        let profile = repo
            .get_profile(volunteer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Volunteer not found"))?;
        Ok(VolunteerProfileView::from(&profile))
    }

    /// Store a resume for the caller's application to `job_id`
    pub async fn upload_resume(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
        original_filename: &str,
        contents: &[u8],
    ) -> AppResult<i64> {
        let volunteer_id = self.volunteer_id(auth_user).await?;
        self.storage.check_upload(original_filename, contents.len())?;

        let application = ApplicationRepository::new(self.pool)
            .find(job_id, volunteer_id)
            .await?
            .ok_or_else(|| {
                AppError::bad_request("You must apply for the job first before uploading a resume")
            })?;

        let resumes = ResumeRepository::new(self.pool);
        if resumes.get_by_application(application.id).await?.is_some() {
            return Err(AppError::bad_request(
                "A resume has already been uploaded for this application",
            ));
        }

        let stored = self.storage.save(original_filename, contents).await?;
        let resume_id = match resumes
            .create(application.id, &stored, original_filename)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                if let Err(remove_err) = self.storage.remove(&stored).await {
                    warn!(error = %remove_err, file = %stored, "Failed to remove orphaned resume");
                }
                return Err(e.into());
            }
        };

        info!(
            resume_id = resume_id,
            application_id = application.id,
            "Resume uploaded"
        );
        Ok(resume_id)
    }
}
