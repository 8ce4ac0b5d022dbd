//! User account repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::models::{AccountChanges, NewUser, User};
use crate::utils::dates::parse_db_timestamp;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    role: String,
    full_name: Option<String>,
    phone: Option<String>,
    image_url: Option<String>,
    created_at: String,
}

const USER_COLUMNS: &str =
    "id, email, password_hash, role, full_name, phone, image_url, created_at";

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get user")?;

        row.map(row_to_user).transpose()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get user by email")?;

        row.map(row_to_user).transpose()
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await
            .context("Failed to check email")?;
        Ok(count > 0)
    }

    /// Insert an account; returns the new id
    pub async fn insert(conn: &mut SqliteConnection, user: &NewUser) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, role, full_name, phone, image_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(&user.image_url)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await
        .context("Failed to create user")?;

        Ok(result.last_insert_rowid())
    }

    /// Apply the non-empty fields of `changes`
    pub async fn update_account(
        conn: &mut SqliteConnection,
        id: i64,
        changes: &AccountChanges,
    ) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut set = builder.separated(", ");
        let fields = [
            ("email", &changes.email),
            ("phone", &changes.phone),
            ("image_url", &changes.image_url),
            ("full_name", &changes.full_name),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                set.push(format!("{} = ", column));
                set.push_bind_unseparated(value.clone());
            }
        }
        builder.push(" WHERE id = ").push_bind(id);

        builder
            .build()
            .execute(&mut *conn)
            .await
            .context("Failed to update user")?;
        Ok(())
    }
}

fn row_to_user(row: UserRow) -> Result<User> {
    Ok(User {
        id: row.id,
        email: row.email,
        password_hash: row.password_hash,
        role: row
            .role
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{} for user {}", e, row.id))?,
        full_name: row.full_name,
        phone: row.phone,
        image_url: row.image_url,
        created_at: parse_db_timestamp(&row.created_at),
    })
}
