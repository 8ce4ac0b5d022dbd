//! Authentication service
//!
//! Password hashing with Argon2, account registration and login.

use anyhow::Result;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    config::AuthConfig,
    db::{CommanderRepository, HrRepository, UserRepository, VolunteerRepository},
    middleware::auth::{create_access_token, AuthUser},
    models::{
        AccountView, CurrentAccountResponse, LoginRequest, LoginResponse, NewCommander,
        NewHrStaff, NewUser, NewVolunteer, Role, StaffAccountView, User, VolunteerAccountView,
        VolunteerChanges, VolunteerRegistration,
    },
    utils::{
        dates::{parse_birth_date, parse_iso_datetime},
        error::{AppError, AppResult},
        validation::validate_email,
    },
};

/// Date format of `date_of_birth` in the login payload, e.g. `2000-Nov-11`
const LOGIN_DATE_FORMAT: &str = "%Y-%b-%d";

/// Authentication service for account management
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    config: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: &'a SqlitePool, config: &'a AuthConfig) -> Self {
        Self { pool, config }
    }

    /// Hash a password using Argon2id
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Check the shared account fields before anything is written
    pub async fn check_new_account(&self, email: &str, password: &str) -> AppResult<()> {
        if !validate_email(email) {
            return Err(AppError::bad_request("Invalid email address"));
        }
        if password.chars().count() < self.config.password_min_length {
            return Err(AppError::bad_request(format!(
                "Password must be at least {} characters long",
                self.config.password_min_length
            )));
        }
        if UserRepository::new(self.pool).email_exists(email).await? {
            return Err(AppError::conflict("Email already registered"));
        }
        Ok(())
    }

    /// Register an account and its role profile in one transaction
    ///
    /// `payload` holds `email`, `password`, `role` and the profile fields of
    /// that role.
    pub async fn register(&self, mut payload: Map<String, Value>) -> AppResult<i64> {
        let email = take_required_string(&mut payload, "email")?;
        let password = take_required_string(&mut payload, "password")?;
        let role: Role = take_required_string(&mut payload, "role")?
            .parse()
            .map_err(AppError::BadRequest)?;

        let profile = RegistrationProfile::parse(role, payload)?;
        self.check_new_account(&email, &password).await?;
        if let RegistrationProfile::Volunteer { ref fields, .. } = profile {
            if VolunteerRepository::new(self.pool)
                .national_id_exists(&fields.national_id)
                .await?
            {
                return Err(AppError::conflict("National ID already registered"));
            }
        }

        let new_user = NewUser {
            email: email.clone(),
            password_hash: Self::hash_password(&password)?,
            role,
            full_name: profile.display_name(),
            phone: profile.phone(),
            image_url: None,
        };

        let mut tx = self.pool.begin().await?;
        let user_id = UserRepository::insert(&mut tx, &new_user).await?;

        match profile {
            RegistrationProfile::Volunteer {
                fields,
                join_date,
                changes,
            } => {
                let volunteer_id = VolunteerRepository::insert(
                    &mut tx,
                    &NewVolunteer {
                        user_id,
                        full_name: fields.full_name,
                        national_id: fields.national_id,
                        join_date,
                    },
                )
                .await?;
                VolunteerRepository::update(&mut tx, volunteer_id, &changes).await?;
            }
            RegistrationProfile::Commander(commander) => {
                CommanderRepository::insert(&mut tx, user_id, &commander).await?;
            }
            RegistrationProfile::Hr(hr) => {
                HrRepository::insert(&mut tx, user_id, &hr).await?;
            }
        }

        tx.commit().await?;
        info!(user_id = user_id, role = %role, "Account registered");

        Ok(user_id)
    }

    /// Authenticate by email and password and issue an access token
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let (Some(email), Some(password)) = (
            request.email.as_deref().filter(|e| !e.is_empty()),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::bad_request("Missing email or password"));
        };

        let user = match UserRepository::new(self.pool).get_by_email(email).await? {
            Some(user) if Self::verify_password(password, &user.password_hash)? => user,
            _ => {
                warn!(email = %email, "Failed login attempt");
                return Err(AppError::unauthorized("Invalid credentials"));
            }
        };

        let access_token = create_access_token(
            user.id,
            user.role,
            &self.config.jwt_secret,
            self.config.token_expiry_hours,
        )
        .map_err(|e| AppError::internal(format!("Failed to create access token: {}", e)))?;

        let account = self.account_view(&user).await?;
        info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            access_token,
            role: user.role,
            user: account,
        })
    }

    /// Account of the token holder
    pub async fn current_account(&self, auth_user: &AuthUser) -> AppResult<CurrentAccountResponse> {
        let user = UserRepository::new(self.pool)
            .get_by_id(auth_user.id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        Ok(CurrentAccountResponse {
            role: user.role,
            user: self.account_view(&user).await?,
        })
    }

    /// Role-specific account payload
    async fn account_view(&self, user: &User) -> AppResult<Option<AccountView>> {
        match user.role {
            Role::Volunteer => Ok(VolunteerRepository::new(self.pool)
                .get_profile_by_user(user.id)
                .await?
                .map(|profile| {
                    AccountView::Volunteer(VolunteerAccountView::new(&profile, LOGIN_DATE_FORMAT))
                })),
            Role::Commander | Role::Hr => Ok(Some(AccountView::Staff(StaffAccountView::from(user)))),
        }
    }
}

/// Validated role profile of a registration
enum RegistrationProfile {
    Volunteer {
        fields: VolunteerRegistration,
        join_date: chrono::DateTime<Utc>,
        changes: VolunteerChanges,
    },
    Commander(NewCommander),
    Hr(NewHrStaff),
}

impl RegistrationProfile {
    fn parse(role: Role, fields: Map<String, Value>) -> AppResult<Self> {
        let fields = Value::Object(fields);
        match role {
            Role::Volunteer => {
                let fields: VolunteerRegistration = serde_json::from_value(fields)?;
                if fields.full_name.trim().is_empty() || fields.national_id.trim().is_empty() {
                    return Err(AppError::bad_request(
                        "full_name and national_id are required",
                    ));
                }
                let join_date = match fields.join_date.as_deref() {
                    Some(value) => parse_iso_datetime(value)
                        .map(|dt| dt.and_utc())
                        .ok_or_else(|| {
                            AppError::bad_request(
                                "Invalid join_date format. Use ISO 8601 format (YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DDTHH:MM:SS+HH:MM)",
                            )
                        })?,
                    None => Utc::now(),
                };
                let changes = volunteer_extras(&fields)?;
                Ok(RegistrationProfile::Volunteer {
                    fields,
                    join_date,
                    changes,
                })
            }
            Role::Commander => {
                let commander: NewCommander = serde_json::from_value(fields)?;
                if commander.name.trim().is_empty() {
                    return Err(AppError::bad_request("name is required"));
                }
                Ok(RegistrationProfile::Commander(commander))
            }
            Role::Hr => Ok(RegistrationProfile::Hr(serde_json::from_value(fields)?)),
        }
    }

    fn display_name(&self) -> Option<String> {
        match self {
            RegistrationProfile::Volunteer { fields, .. } => Some(fields.full_name.clone()),
            RegistrationProfile::Commander(commander) => Some(commander.name.clone()),
            RegistrationProfile::Hr(hr) => hr.name.clone(),
        }
    }

    fn phone(&self) -> Option<String> {
        match self {
            RegistrationProfile::Volunteer { .. } => None,
            RegistrationProfile::Commander(commander) => commander.phone.clone(),
            RegistrationProfile::Hr(hr) => hr.phone.clone(),
        }
    }
}

/// Optional volunteer profile fields supplied at registration
fn volunteer_extras(fields: &VolunteerRegistration) -> AppResult<VolunteerChanges> {
    let mut changes = VolunteerChanges::default();
    let text = [
        ("address", &fields.address),
        ("primary_profession", &fields.primary_profession),
        ("education", &fields.education),
        ("area_of_interest", &fields.area_of_interest),
        ("contact_reference", &fields.contact_reference),
        ("experience", &fields.experience),
        ("courses", &fields.courses),
        ("languages", &fields.languages),
        ("interests", &fields.interests),
        ("personal_summary", &fields.personal_summary),
    ];
    for (column, value) in text {
        if value.is_some() {
            changes.set_text(column, value.clone());
        }
    }
    if let Some(profile) = fields.profile {
        changes.profile = Some(Some(profile));
    }
    if let Some(value) = fields.date_of_birth.as_deref() {
        let date = parse_birth_date(value)
            .ok_or_else(|| AppError::bad_request("Invalid date format for date_of_birth"))?;
        changes.date_of_birth = Some(Some(date));
    }
    if let Some(value) = fields.gender.as_deref() {
        let gender = value.parse().map_err(AppError::BadRequest)?;
        changes.gender = Some(Some(gender));
    }
    Ok(changes)
}

fn take_required_string(payload: &mut Map<String, Value>, key: &str) -> AppResult<String> {
    match payload.remove(key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err(AppError::bad_request(format!("Missing field: {}", key)))
        }
        Some(_) => Err(AppError::bad_request(format!("Field {} must be a string", key))),
    }
}
