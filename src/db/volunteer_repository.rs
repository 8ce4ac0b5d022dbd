//! Volunteer profile repository

use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::models::{NewVolunteer, Volunteer, VolunteerChanges, VolunteerProfile};
use crate::utils::dates::{parse_db_date, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct VolunteerRow {
    id: i64,
    user_id: i64,
    full_name: String,
    national_id: String,
    join_date: String,
    address: Option<String>,
    primary_profession: Option<String>,
    education: Option<String>,
    area_of_interest: Option<String>,
    contact_reference: Option<String>,
    profile: Option<i64>,
    date_of_birth: Option<String>,
    gender: Option<String>,
    experience: Option<String>,
    courses: Option<String>,
    languages: Option<String>,
    interests: Option<String>,
    personal_summary: Option<String>,
    email: String,
    phone: Option<String>,
    image_url: Option<String>,
}

const PROFILE_SELECT: &str = r#"
    SELECT v.id, v.user_id, v.full_name, v.national_id, v.join_date, v.address,
           v.primary_profession, v.education, v.area_of_interest, v.contact_reference,
           v.profile, v.date_of_birth, v.gender, v.experience, v.courses, v.languages,
           v.interests, v.personal_summary, u.email, u.phone, u.image_url
    FROM volunteers v
    JOIN users u ON u.id = v.user_id
"#;

pub struct VolunteerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> VolunteerRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, id: i64) -> Result<Option<VolunteerProfile>> {
        let row = sqlx::query_as::<_, VolunteerRow>(&format!("{} WHERE v.id = ?", PROFILE_SELECT))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .context("Failed to get volunteer")?;

        Ok(row.map(row_to_profile))
    }

    pub async fn get_profile_by_user(&self, user_id: i64) -> Result<Option<VolunteerProfile>> {
        let row = sqlx::query_as::<_, VolunteerRow>(&format!(
            "{} WHERE v.user_id = ?",
            PROFILE_SELECT
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get volunteer by user")?;

        Ok(row.map(row_to_profile))
    }

    pub async fn list_profiles(&self) -> Result<Vec<VolunteerProfile>> {
        let rows = sqlx::query_as::<_, VolunteerRow>(&format!("{} ORDER BY v.id", PROFILE_SELECT))
            .fetch_all(self.pool)
            .await
            .context("Failed to list volunteers")?;

        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    /// Profile id owned by `user_id`, if any
    pub async fn id_for_user(&self, user_id: i64) -> Result<Option<i64>> {
        sqlx::query_scalar("SELECT id FROM volunteers WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await
            .context("Failed to resolve volunteer profile")
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM volunteers WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await
            .context("Failed to check volunteer")?;
        Ok(count > 0)
    }

    pub async fn exists_in(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM volunteers WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .context("Failed to check volunteer")?;
        Ok(count > 0)
    }

    pub async fn national_id_exists(&self, national_id: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM volunteers WHERE national_id = ?")
                .bind(national_id)
                .fetch_one(self.pool)
                .await
                .context("Failed to check national id")?;
        Ok(count > 0)
    }

    /// Whether a volunteer other than `volunteer_id` holds `national_id`
    pub async fn national_id_taken_by_other(
        &self,
        national_id: &str,
        volunteer_id: i64,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM volunteers WHERE national_id = ? AND id != ?",
        )
        .bind(national_id)
        .bind(volunteer_id)
        .fetch_one(self.pool)
        .await
        .context("Failed to check national id")?;
        Ok(count > 0)
    }

    /// Insert a profile; returns the new id
    pub async fn insert(conn: &mut SqliteConnection, volunteer: &NewVolunteer) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO volunteers (user_id, full_name, national_id, join_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(volunteer.user_id)
        .bind(&volunteer.full_name)
        .bind(&volunteer.national_id)
        .bind(volunteer.join_date.to_rfc3339())
        .execute(&mut *conn)
        .await
        .context("Failed to create volunteer")?;

        Ok(result.last_insert_rowid())
    }

    /// Apply a partial update; columns come from a fixed whitelist
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        changes: &VolunteerChanges,
    ) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE volunteers SET ");
        let mut set = builder.separated(", ");
        for (column, value) in &changes.text {
            set.push(format!("{} = ", column));
            set.push_bind_unseparated(value.clone());
        }
        if let Some(profile) = changes.profile {
            set.push("profile = ");
            set.push_bind_unseparated(profile);
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            set.push("date_of_birth = ");
            set.push_bind_unseparated(date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()));
        }
        if let Some(gender) = changes.gender {
            set.push("gender = ");
            set.push_bind_unseparated(gender.map(|g| g.value()));
        }
        builder.push(" WHERE id = ").push_bind(id);

        builder
            .build()
            .execute(&mut *conn)
            .await
            .context("Failed to update volunteer")?;
        Ok(())
    }
}

fn row_to_profile(row: VolunteerRow) -> VolunteerProfile {
    VolunteerProfile {
        volunteer: Volunteer {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            national_id: row.national_id,
            join_date: parse_db_timestamp(&row.join_date),
            address: row.address,
            primary_profession: row.primary_profession,
            education: row.education,
            area_of_interest: row.area_of_interest,
            contact_reference: row.contact_reference,
            profile: row.profile,
            date_of_birth: row.date_of_birth.as_deref().and_then(parse_db_date),
            gender: row.gender.and_then(|g| g.parse().ok()),
            experience: row.experience,
            courses: row.courses,
            languages: row.languages,
            interests: row.interests,
            personal_summary: row.personal_summary,
        },
        email: row.email,
        phone: row.phone,
        image_url: row.image_url,
    }
}
