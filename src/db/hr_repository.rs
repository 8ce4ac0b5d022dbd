//! HR staff profile repository

use anyhow::{Context, Result};
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{HrStaff, NewHrStaff};

#[derive(Debug, sqlx::FromRow)]
struct HrRow {
    id: i64,
    user_id: i64,
    name: Option<String>,
    department: Option<String>,
    phone: Option<String>,
}

pub struct HrRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HrRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_user(&self, user_id: i64) -> Result<Option<HrStaff>> {
        let row = sqlx::query_as::<_, HrRow>(
            "SELECT id, user_id, name, department, phone FROM hr_staff WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get HR profile")?;

        Ok(row.map(|row| HrStaff {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            department: row.department,
            phone: row.phone,
        }))
    }

    /// Insert a profile; returns the new id
    pub async fn insert(conn: &mut SqliteConnection, user_id: i64, hr: &NewHrStaff) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO hr_staff (user_id, name, department, phone) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&hr.name)
        .bind(&hr.department)
        .bind(&hr.phone)
        .execute(&mut *conn)
        .await
        .context("Failed to create HR profile")?;

        Ok(result.last_insert_rowid())
    }
}
