//! Job application repository

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use crate::models::{
    ApplicantView, ApplicationExportRow, ApplicationStatus, JobApplicantView, JobApplication,
    VolunteerApplicationView,
};
use crate::utils::dates::{age_today, parse_db_date, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: i64,
    job_id: i64,
    volunteer_id: i64,
    status: String,
    application_date: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicantRow {
    volunteer_id: i64,
    full_name: String,
    date_of_birth: Option<String>,
    status: String,
    image_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct TitledApplicationRow {
    id: i64,
    label: String,
    status: String,
    application_date: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ExportRow {
    id: i64,
    full_name: String,
    status: String,
    application_date: String,
    phone: Option<String>,
    email: String,
    education: Option<String>,
    interview_status: Option<String>,
}

const APPLICATION_COLUMNS: &str = "id, job_id, volunteer_id, status, application_date";

pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<JobApplication>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM job_applications WHERE id = ?",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get application")?;

        row.map(row_to_application).transpose()
    }

    pub async fn find(&self, job_id: i64, volunteer_id: i64) -> Result<Option<JobApplication>> {
        find_application(self.pool, job_id, volunteer_id).await
    }

    /// Look up an application inside an open transaction
    pub async fn find_in(
        conn: &mut SqliteConnection,
        job_id: i64,
        volunteer_id: i64,
    ) -> Result<Option<JobApplication>> {
        find_application(&mut *conn, job_id, volunteer_id).await
    }

    /// Insert a pending application; returns the new id
    pub async fn insert(conn: &mut SqliteConnection, job_id: i64, volunteer_id: i64) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_applications (job_id, volunteer_id, status, application_date)
            VALUES (?, ?, 'pending', ?)
            "#,
        )
        .bind(job_id)
        .bind(volunteer_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await
        .context("Failed to create application")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_answer(
        conn: &mut SqliteConnection,
        application_id: i64,
        question_id: i64,
        answer_text: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO application_answers (application_id, question_id, answer_text) VALUES (?, ?, ?)",
        )
        .bind(application_id)
        .bind(question_id)
        .bind(answer_text)
        .execute(&mut *conn)
        .await
        .context("Failed to store application answer")?;
        Ok(())
    }

    /// Delete an application; answers, resume row and interview cascade
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_applications WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context("Failed to delete application")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_status(&self, id: i64, status: ApplicationStatus) -> Result<()> {
        set_status(self.pool, id, status).await
    }

    pub async fn update_status_in(
        conn: &mut SqliteConnection,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<()> {
        set_status(&mut *conn, id, status).await
    }

    /// Applicants to a job, as shown to its commander
    pub async fn list_applicants(&self, job_id: i64) -> Result<Vec<ApplicantView>> {
        let rows = sqlx::query_as::<_, ApplicantRow>(
            r#"
            SELECT v.id AS volunteer_id, v.full_name, v.date_of_birth, a.status, u.image_url
            FROM job_applications a
            JOIN volunteers v ON v.id = a.volunteer_id
            JOIN users u ON u.id = v.user_id
            WHERE a.job_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(job_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to list applicants")?;

        rows.into_iter()
            .map(|row| -> Result<ApplicantView> {
                let status = stored_status(&row.status)?;
                Ok(ApplicantView {
                    candidate_user_id: row.volunteer_id,
                    name: row.full_name,
                    age: row.date_of_birth.as_deref().and_then(parse_db_date).map(age_today),
                    status,
                    image_url: row.image_url,
                })
            })
            .collect()
    }

    /// Job id (as string) to status, for every application of a volunteer
    pub async fn job_statuses(&self, volunteer_id: i64) -> Result<BTreeMap<String, ApplicationStatus>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT job_id, status FROM job_applications WHERE volunteer_id = ?")
                .bind(volunteer_id)
                .fetch_all(self.pool)
                .await
                .context("Failed to list application statuses")?;

        rows.into_iter()
            .map(|(job_id, status)| -> Result<(String, ApplicationStatus)> {
                Ok((job_id.to_string(), stored_status(&status)?))
            })
            .collect()
    }

    /// Whether the volunteer applied to any job owned by the commander
    pub async fn applied_to_commander(&self, commander_id: i64, volunteer_id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM job_applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE j.commander_id = ? AND a.volunteer_id = ?
            "#,
        )
        .bind(commander_id)
        .bind(volunteer_id)
        .fetch_one(self.pool)
        .await
        .context("Failed to check applications")?;
        Ok(count > 0)
    }

    pub async fn list_for_volunteer(&self, volunteer_id: i64) -> Result<Vec<VolunteerApplicationView>> {
        let rows = sqlx::query_as::<_, TitledApplicationRow>(
            r#"
            SELECT a.id, j.title AS label, a.status, a.application_date
            FROM job_applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.volunteer_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(volunteer_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to list volunteer applications")?;

        rows.into_iter()
            .map(|row| -> Result<VolunteerApplicationView> {
                let status = stored_status(&row.status)?;
                Ok(VolunteerApplicationView {
                    id: row.id,
                    job_title: row.label,
                    status,
                    application_date: parse_db_timestamp(&row.application_date),
                })
            })
            .collect()
    }

    pub async fn list_for_job(&self, job_id: i64) -> Result<Vec<JobApplicantView>> {
        let rows = sqlx::query_as::<_, TitledApplicationRow>(
            r#"
            SELECT a.id, v.full_name AS label, a.status, a.application_date
            FROM job_applications a
            JOIN volunteers v ON v.id = a.volunteer_id
            WHERE a.job_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(job_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to list job applications")?;

        rows.into_iter()
            .map(|row| -> Result<JobApplicantView> {
                let status = stored_status(&row.status)?;
                Ok(JobApplicantView {
                    id: row.id,
                    volunteer_name: row.label,
                    status,
                    application_date: parse_db_timestamp(&row.application_date),
                })
            })
            .collect()
    }

    /// Rows of the applications export for one job
    pub async fn export_rows(&self, job_id: i64) -> Result<Vec<ApplicationExportRow>> {
        let rows = sqlx::query_as::<_, ExportRow>(
            r#"
            SELECT a.id, v.full_name, a.status, a.application_date, u.phone, u.email,
                   v.education, i.status AS interview_status
            FROM job_applications a
            JOIN volunteers v ON v.id = a.volunteer_id
            JOIN users u ON u.id = v.user_id
            LEFT JOIN interviews i ON i.application_id = a.id
            WHERE a.job_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(job_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to load applications for export")?;

        rows.into_iter()
            .map(|row| -> Result<ApplicationExportRow> {
                let status = stored_status(&row.status)?;
                Ok(ApplicationExportRow {
                    application_id: row.id,
                    volunteer_name: row.full_name,
                    status,
                    application_date: parse_db_timestamp(&row.application_date),
                    phone: row.phone,
                    email: row.email,
                    education: row.education,
                    interview_status: row.interview_status,
                })
            })
            .collect()
    }
}

async fn find_application<'e, E>(
    executor: E,
    job_id: i64,
    volunteer_id: i64,
) -> Result<Option<JobApplication>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ApplicationRow>(&format!(
        "SELECT {} FROM job_applications WHERE job_id = ? AND volunteer_id = ?",
        APPLICATION_COLUMNS
    ))
    .bind(job_id)
    .bind(volunteer_id)
    .fetch_optional(executor)
    .await
    .context("Failed to find application")?;

    row.map(row_to_application).transpose()
}

async fn set_status<'e, E>(executor: E, id: i64, status: ApplicationStatus) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE job_applications SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(executor)
        .await
        .context("Failed to update application status")?;
    Ok(())
}

fn stored_status(raw: &str) -> Result<ApplicationStatus> {
    raw.parse::<ApplicationStatus>()
        .map_err(|_| anyhow!("Unrecognized application status in database: {}", raw))
}

fn row_to_application(row: ApplicationRow) -> Result<JobApplication> {
    Ok(JobApplication {
        id: row.id,
        job_id: row.job_id,
        volunteer_id: row.volunteer_id,
        status: stored_status(&row.status)?,
        application_date: parse_db_timestamp(&row.application_date),
    })
}
