//! HR operations: staff bootstrap, volunteer records, job overview and hiring

use chrono::Utc;
use rand::Rng;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    config::{AuthConfig, AvatarConfig},
    db::{ApplicationRepository, HrRepository, JobRepository, UserRepository, VolunteerRepository},
    middleware::auth::AuthUser,
    models::{
        ApplicationStatus, AssignmentRequest, CreateHrRequest, CreateVolunteerRequest,
        JobApplicantView, JobCard, JobStatus, NewHrStaff, NewUser, NewVolunteer, Role,
        VolunteerApplicationView, VolunteerDetailView,
    },
    services::{
        auth::AuthService,
        volunteer::{ensure_national_id_free, parse_profile_update, ProfileEditor},
    },
    utils::error::{AppError, AppResult},
};

/// Ids of a volunteer account created by HR
#[derive(Debug, Clone, Copy)]
pub struct CreatedVolunteer {
    pub user_id: i64,
    pub volunteer_id: i64,
}

/// Avatar picked from the configured pool, `{base_url}/{n}.jpg`
pub fn random_avatar(avatars: &AvatarConfig) -> String {
    let count = avatars.count.max(1);
    let n = rand::thread_rng().gen_range(1..=count);
    format!("{}/{}.jpg", avatars.base_url.trim_end_matches('/'), n)
}

pub struct HrService<'a> {
    pool: &'a SqlitePool,
    auth: &'a AuthConfig,
}

impl<'a> HrService<'a> {
    pub fn new(pool: &'a SqlitePool, auth: &'a AuthConfig) -> Self {
        Self { pool, auth }
    }

    /// Create an HR account; open to bootstrap the first staff member
    pub async fn create_hr(&self, request: CreateHrRequest) -> AppResult<i64> {
        request.validate()?;
        AuthService::new(self.pool, self.auth)
            .check_new_account(&request.email, &request.password)
            .await?;

        let profile = NewHrStaff {
            name: request.name,
            department: request.department,
            phone: request.phone,
        };
        let user = NewUser {
            email: request.email,
            password_hash: AuthService::hash_password(&request.password)?,
            role: Role::Hr,
            full_name: profile.name.clone(),
            phone: profile.phone.clone(),
            image_url: None,
        };

        let mut tx = self.pool.begin().await?;
        let user_id = UserRepository::insert(&mut tx, &user).await?;
        let hr_id = HrRepository::insert(&mut tx, user_id, &profile).await?;
        tx.commit().await?;

        info!(user_id = user_id, hr_id = hr_id, "HR account created");
        Ok(hr_id)
    }

    /// Create a volunteer account whose initial password is the national id
    pub async fn create_volunteer(
        &self,
        auth_user: &AuthUser,
        request: CreateVolunteerRequest,
        avatars: &AvatarConfig,
    ) -> AppResult<CreatedVolunteer> {
        auth_user.require_role(Role::Hr)?;
        request.validate()?;

        if UserRepository::new(self.pool)
            .email_exists(&request.email)
            .await?
        {
            return Err(AppError::conflict("Email already registered"));
        }
        if VolunteerRepository::new(self.pool)
            .national_id_exists(&request.national_id)
            .await?
        {
            return Err(AppError::conflict("National ID already registered"));
        }

        let user = NewUser {
            email: request.email,
            password_hash: AuthService::hash_password(&request.national_id)?,
            role: Role::Volunteer,
            full_name: Some(request.full_name.clone()),
            phone: request.phone,
            image_url: Some(random_avatar(avatars)),
        };

        let mut tx = self.pool.begin().await?;
        let user_id = UserRepository::insert(&mut tx, &user).await?;
        let volunteer_id = VolunteerRepository::insert(
            &mut tx,
            &NewVolunteer {
                user_id,
                full_name: request.full_name,
                national_id: request.national_id,
                join_date: Utc::now(),
            },
        )
        .await?;
        tx.commit().await?;

        info!(user_id = user_id, volunteer_id = volunteer_id, "Volunteer created by HR");
        Ok(CreatedVolunteer {
            user_id,
            volunteer_id,
        })
    }

    pub async fn list_volunteers(&self, auth_user: &AuthUser) -> AppResult<Vec<VolunteerDetailView>> {
        auth_user.require_role(Role::Hr)?;
        let applications = ApplicationRepository::new(self.pool);
        let profiles = VolunteerRepository::new(self.pool).list_profiles().await?;

        let mut views = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            let statuses = applications.job_statuses(profile.volunteer.id).await?;
            views.push(VolunteerDetailView::new(profile, statuses));
        }
        Ok(views)
    }

    pub async fn get_volunteer(
        &self,
        auth_user: &AuthUser,
        volunteer_id: i64,
    ) -> AppResult<VolunteerDetailView> {
        auth_user.require_role(Role::Hr)?;
        let profile = VolunteerRepository::new(self.pool)
            .get_profile(volunteer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Volunteer not found"))?;
        let statuses = ApplicationRepository::new(self.pool)
            .job_statuses(volunteer_id)
            .await?;
        Ok(VolunteerDetailView::new(&profile, statuses))
    }

    /// Lenient profile update: unknown keys are ignored
    pub async fn update_volunteer(
        &self,
        auth_user: &AuthUser,
        volunteer_id: i64,
        payload: &Map<String, Value>,
    ) -> AppResult<()> {
        auth_user.require_role(Role::Hr)?;
        let repo = VolunteerRepository::new(self.pool);
        if !repo.exists(volunteer_id).await? {
            return Err(AppError::not_found("Volunteer not found"));
        }
        let update = parse_profile_update(payload, ProfileEditor::Staff)?;
        ensure_national_id_free(&repo, volunteer_id, &update.volunteer).await?;

        let mut conn = self.pool.acquire().await?;
        VolunteerRepository::update(&mut conn, volunteer_id, &update.volunteer).await?;

        info!(volunteer_id = volunteer_id, "Volunteer updated by HR");
        Ok(())
    }

    pub async fn list_jobs(&self, auth_user: &AuthUser) -> AppResult<Vec<JobCard>> {
        auth_user.require_role(Role::Hr)?;
        let summaries = JobRepository::new(self.pool).list_summaries().await?;
        Ok(summaries.into_iter().map(JobCard::with_common_qa).collect())
    }

    /// Hire a volunteer into a job; returns the application id.
    ///
    /// Positions are decremented, the application becomes `hired` and the job
    /// closes when no positions remain, all in one transaction.
    pub async fn assign(&self, auth_user: &AuthUser, request: &AssignmentRequest) -> AppResult<i64> {
        auth_user.require_role(Role::Hr)?;

        let mut tx = self.pool.begin().await?;

        if !VolunteerRepository::exists_in(&mut tx, request.volunteer_id).await? {
            return Err(AppError::not_found("Volunteer not found"));
        }
        let job = JobRepository::get_in(&mut tx, request.job_id)
            .await?
            .ok_or_else(|| AppError::not_found("Job not found"))?;
        let application = ApplicationRepository::find_in(&mut tx, request.job_id, request.volunteer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Application not found"))?;

        if application.status != ApplicationStatus::PreferredFinal {
            warn!(
                application_id = application.id,
                status = %application.status,
                "Assignment refused: application not accepted"
            );
            return Err(AppError::bad_request(
                "Application must be accepted by commander first",
            ));
        }
        if job.vacant_positions <= 0 {
            return Err(AppError::bad_request("No vacant positions available"));
        }

        let remaining = job.vacant_positions - 1;
        let status = if remaining == 0 {
            JobStatus::Closed
        } else {
            job.status
        };
        JobRepository::set_positions(&mut tx, job.id, remaining, status).await?;
        ApplicationRepository::update_status_in(&mut tx, application.id, ApplicationStatus::Hired)
            .await?;
        tx.commit().await?;

        info!(
            application_id = application.id,
            job_id = job.id,
            volunteer_id = request.volunteer_id,
            remaining_positions = remaining,
            "Volunteer hired"
        );
        Ok(application.id)
    }

    pub async fn volunteer_applications(
        &self,
        auth_user: &AuthUser,
        volunteer_id: i64,
    ) -> AppResult<Vec<VolunteerApplicationView>> {
        auth_user.require_role(Role::Hr)?;
        Ok(ApplicationRepository::new(self.pool)
            .list_for_volunteer(volunteer_id)
            .await?)
    }

    pub async fn job_applications(
        &self,
        auth_user: &AuthUser,
        job_id: i64,
    ) -> AppResult<Vec<JobApplicantView>> {
        auth_user.require_role(Role::Hr)?;
        Ok(ApplicationRepository::new(self.pool)
            .list_for_job(job_id)
            .await?)
    }
}
