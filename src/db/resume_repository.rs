//! Resume metadata repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::Resume;
use crate::utils::dates::parse_db_timestamp;

#[derive(Debug, sqlx::FromRow)]
struct ResumeRow {
    id: i64,
    application_id: i64,
    file_path: String,
    original_filename: String,
    upload_date: String,
}

pub struct ResumeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ResumeRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_application(&self, application_id: i64) -> Result<Option<Resume>> {
        let row = sqlx::query_as::<_, ResumeRow>(
            "SELECT id, application_id, file_path, original_filename, upload_date FROM resumes WHERE application_id = ?",
        )
        .bind(application_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get resume")?;

        Ok(row.map(row_to_resume))
    }

    /// Stored file name for an application, read inside a transaction
    pub async fn file_path_in(conn: &mut SqliteConnection, application_id: i64) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT file_path FROM resumes WHERE application_id = ?")
            .bind(application_id)
            .fetch_optional(&mut *conn)
            .await
            .context("Failed to get resume path")
    }

    pub async fn create(
        &self,
        application_id: i64,
        file_path: &str,
        original_filename: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO resumes (application_id, file_path, original_filename, upload_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(application_id)
        .bind(file_path)
        .bind(original_filename)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool)
        .await
        .context("Failed to store resume")?;

        Ok(result.last_insert_rowid())
    }
}

fn row_to_resume(row: ResumeRow) -> Resume {
    Resume {
        id: row.id,
        application_id: row.application_id,
        file_path: row.file_path,
        original_filename: row.original_filename,
        upload_date: parse_db_timestamp(&row.upload_date),
    }
}
