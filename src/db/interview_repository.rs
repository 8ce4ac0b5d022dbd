//! Interview repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::warn;

use crate::models::{Interview, InterviewChanges, InterviewResultsRequest, InterviewStatus, NewInterview};
use crate::utils::dates::{format_naive_datetime, parse_db_naive_datetime, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct InterviewRow {
    id: i64,
    application_id: i64,
    scheduled_date: Option<String>,
    general_info: Option<String>,
    schedule: Option<String>,
    management_results: Option<String>,
    personal_results: Option<String>,
    summary: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

const INTERVIEW_COLUMNS: &str = r#"
    id, application_id, scheduled_date, general_info, schedule, management_results,
    personal_results, summary, status, created_at, updated_at
"#;

pub struct InterviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InterviewRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Interview>> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {} FROM interviews WHERE id = ?",
            INTERVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get interview")?;

        Ok(row.map(row_to_interview))
    }

    pub async fn get_by_application(&self, application_id: i64) -> Result<Option<Interview>> {
        let row = sqlx::query_as::<_, InterviewRow>(&format!(
            "SELECT {} FROM interviews WHERE application_id = ?",
            INTERVIEW_COLUMNS
        ))
        .bind(application_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get interview for application")?;

        Ok(row.map(row_to_interview))
    }

    pub async fn create(&self, interview: &NewInterview) -> Result<Interview> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO interviews (application_id, scheduled_date, general_info, schedule, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(interview.application_id)
        .bind(interview.scheduled_date.as_ref().map(format_naive_datetime))
        .bind(&interview.general_info)
        .bind(&interview.schedule)
        .bind(interview.status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create interview")?;

        self.get(result.last_insert_rowid())
            .await?
            .context("Failed to retrieve created interview")
    }

    pub async fn update(&self, id: i64, changes: &InterviewChanges) -> Result<Option<Interview>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE interviews SET ");
        let mut set = builder.separated(", ");
        if let Some(date) = &changes.scheduled_date {
            set.push("scheduled_date = ");
            set.push_bind_unseparated(date.as_ref().map(format_naive_datetime));
        }
        if let Some(general_info) = &changes.general_info {
            set.push("general_info = ");
            set.push_bind_unseparated(general_info.clone());
        }
        if let Some(schedule) = &changes.schedule {
            set.push("schedule = ");
            set.push_bind_unseparated(schedule.clone());
        }
        if let Some(status) = changes.status {
            set.push("status = ");
            set.push_bind_unseparated(status.as_str());
        }
        set.push("updated_at = ");
        set.push_bind_unseparated(Utc::now().to_rfc3339());
        builder.push(" WHERE id = ").push_bind(id);

        builder
            .build()
            .execute(self.pool)
            .await
            .context("Failed to update interview")?;

        self.get(id).await
    }

    /// Store results and mark the interview completed
    pub async fn record_results(&self, id: i64, results: &InterviewResultsRequest) -> Result<Option<Interview>> {
        sqlx::query(
            r#"
            UPDATE interviews
            SET management_results = ?, personal_results = ?, summary = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&results.management_results)
        .bind(&results.personal_results)
        .bind(&results.summary)
        .bind(InterviewStatus::Completed.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(self.pool)
        .await
        .context("Failed to record interview results")?;

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM interviews WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete interview")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_interview(row: InterviewRow) -> Interview {
    Interview {
        id: row.id,
        application_id: row.application_id,
        scheduled_date: row.scheduled_date.as_deref().and_then(parse_db_naive_datetime),
        general_info: row.general_info,
        schedule: row.schedule,
        management_results: row.management_results,
        personal_results: row.personal_results,
        summary: row.summary,
        status: row.status.parse().unwrap_or_else(|err| {
            warn!(id = row.id, error = %err, "Unrecognized interview status in database");
            InterviewStatus::default()
        }),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
