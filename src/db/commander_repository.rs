//! Commander profile repository

use anyhow::{Context, Result};
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{Commander, NewCommander};

#[derive(Debug, sqlx::FromRow)]
struct CommanderRow {
    id: i64,
    user_id: i64,
    name: String,
    rank: Option<String>,
    department: Option<String>,
    phone: Option<String>,
}

impl From<CommanderRow> for Commander {
    fn from(row: CommanderRow) -> Self {
        Commander {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            rank: row.rank,
            department: row.department,
            phone: row.phone,
        }
    }
}

pub struct CommanderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommanderRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_user(&self, user_id: i64) -> Result<Option<Commander>> {
        let row = sqlx::query_as::<_, CommanderRow>(
            "SELECT id, user_id, name, rank, department, phone FROM commanders WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get commander")?;

        Ok(row.map(Commander::from))
    }

    /// Insert a profile; returns the new id
    pub async fn insert(
        conn: &mut SqliteConnection,
        user_id: i64,
        commander: &NewCommander,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO commanders (user_id, name, rank, department, phone) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&commander.name)
        .bind(&commander.rank)
        .bind(&commander.department)
        .bind(&commander.phone)
        .execute(&mut *conn)
        .await
        .context("Failed to create commander")?;

        Ok(result.last_insert_rowid())
    }
}
