//! Job and screening question repository

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::warn;

use crate::models::{CreateJobRequest, Job, JobChanges, JobQuestion, JobStatus, JobSummary};
use crate::utils::dates::parse_db_timestamp;

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: i64,
    commander_id: i64,
    title: String,
    description: Option<String>,
    vacant_positions: i64,
    is_active: bool,
    created_at: String,
    required_certificates: Option<String>,
    required_languages: Option<String>,
    status: String,
    is_open_base: bool,
    additional_info: Option<String>,
    common_questions: Option<String>,
    common_answers: Option<String>,
    experience: Option<String>,
    education: Option<String>,
    passed_courses: Option<String>,
    tech_skills: Option<String>,
    category: Option<String>,
    unit: Option<String>,
    address: Option<String>,
    position: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct JobSummaryRow {
    #[sqlx(flatten)]
    job: JobRow,
    department: Option<String>,
    applications_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    job_id: i64,
    question_text: String,
    answer_text: Option<String>,
}

const JOB_COLUMNS: &str = r#"
    j.id, j.commander_id, j.title, j.description, j.vacant_positions, j.is_active,
    j.created_at, j.required_certificates, j.required_languages, j.status,
    j.is_open_base, j.additional_info, j.common_questions, j.common_answers,
    j.experience, j.education, j.passed_courses, j.tech_skills, j.category,
    j.unit, j.address, j.position
"#;

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Job>> {
        fetch_job(self.pool, id).await
    }

    /// Read a job inside an open transaction
    pub async fn get_in(conn: &mut SqliteConnection, id: i64) -> Result<Option<Job>> {
        fetch_job(&mut *conn, id).await
    }

    /// Jobs volunteers can currently apply to
    pub async fn list_active(&self) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs j WHERE j.is_active = 1 AND j.status = 'open' ORDER BY j.created_at DESC, j.id DESC",
            JOB_COLUMNS
        ))
        .fetch_all(self.pool)
        .await
        .context("Failed to list active jobs")?;

        Ok(rows.into_iter().map(row_to_job).collect())
    }

    pub async fn list_summaries(&self) -> Result<Vec<JobSummary>> {
        self.summaries(None).await
    }

    pub async fn list_summaries_by_commander(&self, commander_id: i64) -> Result<Vec<JobSummary>> {
        self.summaries(Some(commander_id)).await
    }

    pub async fn get_summary(&self, id: i64) -> Result<Option<JobSummary>> {
        let row = sqlx::query_as::<_, JobSummaryRow>(&format!(
            r#"
            SELECT {},
                   c.department AS department,
                   (SELECT COUNT(*) FROM job_applications a WHERE a.job_id = j.id) AS applications_count
            FROM jobs j
            LEFT JOIN commanders c ON c.id = j.commander_id
            WHERE j.id = ?
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get job summary")?;

        Ok(row.map(row_to_summary))
    }

    async fn summaries(&self, commander_id: Option<i64>) -> Result<Vec<JobSummary>> {
        let rows = sqlx::query_as::<_, JobSummaryRow>(&format!(
            r#"
            SELECT {},
                   c.department AS department,
                   (SELECT COUNT(*) FROM job_applications a WHERE a.job_id = j.id) AS applications_count
            FROM jobs j
            LEFT JOIN commanders c ON c.id = j.commander_id
            WHERE (?1 IS NULL OR j.commander_id = ?1)
            ORDER BY j.id
            "#,
            JOB_COLUMNS
        ))
        .bind(commander_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to list jobs")?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    pub async fn questions(&self, job_id: i64) -> Result<Vec<JobQuestion>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, job_id, question_text, answer_text FROM job_questions WHERE job_id = ? ORDER BY id",
        )
        .bind(job_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to list job questions")?;

        Ok(rows.into_iter().map(row_to_question).collect())
    }

    /// Questions of several jobs in one round trip, grouped by job id
    pub async fn questions_for_jobs(&self, job_ids: &[i64]) -> Result<HashMap<i64, Vec<JobQuestion>>> {
        let mut grouped: HashMap<i64, Vec<JobQuestion>> = HashMap::new();
        if job_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, job_id, question_text, answer_text FROM job_questions WHERE job_id IN (",
        );
        let mut ids = builder.separated(", ");
        for id in job_ids {
            ids.push_bind(*id);
        }
        builder.push(") ORDER BY id");

        let rows = builder
            .build_query_as::<QuestionRow>()
            .fetch_all(self.pool)
            .await
            .context("Failed to list job questions")?;

        for row in rows {
            grouped.entry(row.job_id).or_default().push(row_to_question(row));
        }
        Ok(grouped)
    }

    pub async fn questions_in(conn: &mut SqliteConnection, job_id: i64) -> Result<Vec<JobQuestion>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, job_id, question_text, answer_text FROM job_questions WHERE job_id = ? ORDER BY id",
        )
        .bind(job_id)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to list job questions")?;

        Ok(rows.into_iter().map(row_to_question).collect())
    }

    /// Insert a job posting; returns the new id
    pub async fn insert(
        conn: &mut SqliteConnection,
        commander_id: i64,
        req: &CreateJobRequest,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (
                commander_id, title, description, vacant_positions, is_active, created_at,
                status, is_open_base, additional_info, experience, education,
                passed_courses, tech_skills, category, unit, address
            )
            VALUES (?, ?, ?, ?, 1, ?, 'open', ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(commander_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.positions.unwrap_or(1))
        .bind(Utc::now().to_rfc3339())
        .bind(req.open_base.unwrap_or(true))
        .bind(&req.additional_info)
        .bind(&req.work_experience)
        .bind(&req.education)
        .bind(&req.passed_courses)
        .bind(&req.tech_skills)
        .bind(&req.category)
        .bind(&req.unit)
        .bind(&req.address)
        .execute(&mut *conn)
        .await
        .context("Failed to create job")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_question(
        conn: &mut SqliteConnection,
        job_id: i64,
        question_text: &str,
        answer_text: Option<&str>,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO job_questions (job_id, question_text, answer_text) VALUES (?, ?, ?)",
        )
        .bind(job_id)
        .bind(question_text)
        .bind(answer_text)
        .execute(&mut *conn)
        .await
        .context("Failed to create job question")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_question(conn: &mut SqliteConnection, question: &JobQuestion) -> Result<()> {
        sqlx::query("UPDATE job_questions SET question_text = ?, answer_text = ? WHERE id = ?")
            .bind(&question.question_text)
            .bind(&question.answer_text)
            .bind(question.id)
            .execute(&mut *conn)
            .await
            .context("Failed to update job question")?;
        Ok(())
    }

    pub async fn delete_question(conn: &mut SqliteConnection, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM application_answers WHERE question_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context("Failed to delete answers to job question")?;
        sqlx::query("DELETE FROM job_questions WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context("Failed to delete job question")?;
        Ok(())
    }

    /// Apply the column changes of a patch (questions are handled separately)
    pub async fn update(conn: &mut SqliteConnection, id: i64, changes: &JobChanges) -> Result<()> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE jobs SET ");
        let mut set = builder.separated(", ");
        let mut touched = false;

        if let Some(title) = &changes.title {
            set.push("title = ");
            set.push_bind_unseparated(title.clone());
            touched = true;
        }
        if let Some(positions) = changes.vacant_positions {
            set.push("vacant_positions = ");
            set.push_bind_unseparated(positions);
            touched = true;
        }
        if let Some(open_base) = changes.is_open_base {
            set.push("is_open_base = ");
            set.push_bind_unseparated(open_base);
            touched = true;
        }
        if let Some(status) = changes.status {
            set.push("status = ");
            set.push_bind_unseparated(status.as_str());
            touched = true;
        }
        let text_columns = [
            ("description", &changes.description),
            ("category", &changes.category),
            ("unit", &changes.unit),
            ("address", &changes.address),
            ("additional_info", &changes.additional_info),
            ("experience", &changes.experience),
            ("education", &changes.education),
            ("passed_courses", &changes.passed_courses),
            ("tech_skills", &changes.tech_skills),
        ];
        for (column, value) in text_columns {
            if let Some(value) = value {
                set.push(format!("{} = ", column));
                set.push_bind_unseparated(value.clone());
                touched = true;
            }
        }

        if !touched {
            return Ok(());
        }
        builder.push(" WHERE id = ").push_bind(id);

        builder
            .build()
            .execute(&mut *conn)
            .await
            .context("Failed to update job")?;
        Ok(())
    }

    /// Record a hire: set the remaining positions and status
    pub async fn set_positions(
        conn: &mut SqliteConnection,
        id: i64,
        vacant_positions: i64,
        status: JobStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE jobs SET vacant_positions = ?, status = ? WHERE id = ?")
            .bind(vacant_positions)
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *conn)
            .await
            .context("Failed to update job positions")?;
        Ok(())
    }
}

async fn fetch_job<'e, E>(executor: E, id: i64) -> Result<Option<Job>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, JobRow>(&format!("SELECT {} FROM jobs j WHERE j.id = ?", JOB_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("Failed to get job")?;

    Ok(row.map(row_to_job))
}

fn row_to_job(row: JobRow) -> Job {
    Job {
        id: row.id,
        commander_id: row.commander_id,
        title: row.title,
        description: row.description,
        vacant_positions: row.vacant_positions,
        is_active: row.is_active,
        created_at: parse_db_timestamp(&row.created_at),
        required_certificates: row.required_certificates,
        required_languages: row.required_languages,
        status: row.status.parse().unwrap_or_else(|err| {
            warn!(id = row.id, error = %err, "Unrecognized job status in database");
            JobStatus::default()
        }),
        is_open_base: row.is_open_base,
        additional_info: row.additional_info,
        common_questions: row.common_questions,
        common_answers: row.common_answers,
        experience: row.experience,
        education: row.education,
        passed_courses: row.passed_courses,
        tech_skills: row.tech_skills,
        category: row.category,
        unit: row.unit,
        address: row.address,
        position: row.position,
    }
}

fn row_to_summary(row: JobSummaryRow) -> JobSummary {
    JobSummary {
        job: row_to_job(row.job),
        department: row.department,
        applications_count: row.applications_count,
    }
}

fn row_to_question(row: QuestionRow) -> JobQuestion {
    JobQuestion {
        id: row.id,
        job_id: row.job_id,
        question_text: row.question_text,
        answer_text: row.answer_text,
    }
}
