//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings
//! - Optional Google Calendar integration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Google Calendar integration for interview invitations
    #[serde(default)]
    pub calendar: Option<CalendarConfig>,
    #[serde(default)]
    pub avatars: AvatarConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// TLS/HTTPS configuration (if not set, server runs HTTP)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    /// Origins allowed to make credentialed cross-origin requests
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to TLS certificate file (PEM format)
    pub cert_file: PathBuf,
    /// Path to TLS private key file (PEM format)
    pub key_file: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:4200".to_string(),
        "http://127.0.0.1:4200".to_string(),
    ]
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_hours: u64,
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

fn default_token_expiry() -> u64 {
    24
}

fn default_password_min_length() -> usize {
    6
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default)]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file" or "both")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Console,
    File,
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_log_prefix() -> String {
    "volunteer-portal".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

/// Resume upload storage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for uploaded files; resumes go to `<upload_dir>/resumes`
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_resume_extensions")]
    pub allowed_resume_extensions: Vec<String>,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_resume_extensions() -> Vec<String> {
    ["pdf", "doc", "docx", "txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_resume_extensions: default_resume_extensions(),
        }
    }
}

/// Per-IP request rate limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// Requests per second allowed on `/api/auth`
    #[serde(default = "default_auth_rps")]
    pub auth_requests_per_second: u32,
    #[serde(default = "default_auth_burst")]
    pub auth_burst_size: u32,
    #[serde(default = "default_api_rps")]
    pub api_requests_per_second: u32,
    #[serde(default = "default_api_burst")]
    pub api_burst_size: u32,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_auth_rps() -> u32 {
    1
}

fn default_auth_burst() -> u32 {
    5
}

fn default_api_rps() -> u32 {
    20
}

fn default_api_burst() -> u32 {
    50
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            auth_requests_per_second: default_auth_rps(),
            auth_burst_size: default_auth_burst(),
            api_requests_per_second: default_api_rps(),
            api_burst_size: default_api_burst(),
        }
    }
}

/// Google Calendar credentials and defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendarConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Long-lived OAuth refresh token for the organizer account
    pub refresh_token: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_calendar_api_url")]
    pub api_base_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_calendar_timeout")]
    pub timeout_secs: u64,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_time_zone() -> String {
    "Asia/Jerusalem".to_string()
}

fn default_calendar_api_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_calendar_timeout() -> u64 {
    30
}

/// Placeholder avatars assigned to volunteers created by HR
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvatarConfig {
    #[serde(default = "default_avatar_base_url")]
    pub base_url: String,
    #[serde(default = "default_avatar_count")]
    pub count: u32,
}

fn default_avatar_base_url() -> String {
    "https://mighty.tools/mockmind-api/content/human".to_string()
}

fn default_avatar_count() -> u32 {
    130
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: default_avatar_base_url(),
            count: default_avatar_count(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: None,
                tls: None,
                cors_origins: default_cors_origins(),
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production-minimum-32-characters-long".to_string(),
                token_expiry_hours: default_token_expiry(),
                password_min_length: default_password_min_length(),
            },
            database: DatabaseConfig {
                url: "sqlite://./data/volunteer_portal.db?mode=rwc".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            rate_limit: RateLimitConfig::default(),
            calendar: None,
            avatars: AvatarConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("VOLUNTEER_PORTAL_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                Self::from_file(path)?
            }
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => {
                eprintln!("[CONFIG] No config file found, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a YAML configuration file without applying overrides
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/volunteer-portal/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("volunteer-portal/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("VOLUNTEER_PORTAL_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("VOLUNTEER_PORTAL_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("VOLUNTEER_PORTAL_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(target) = std::env::var("VOLUNTEER_PORTAL_LOG_TARGET") {
            self.logging.target = match target.to_lowercase().as_str() {
                "file" => LogTarget::File,
                "both" => LogTarget::Both,
                _ => LogTarget::Console,
            };
        }
        if let Ok(dir) = std::env::var("VOLUNTEER_PORTAL_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("VOLUNTEER_PORTAL_UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
        }

        // Calendar credentials only take effect when all three are present
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok();
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok();
        let refresh_token = std::env::var("GOOGLE_REFRESH_TOKEN").ok();
        if let (Some(client_id), Some(client_secret), Some(refresh_token)) =
            (client_id, client_secret, refresh_token)
        {
            let calendar = self.calendar.get_or_insert_with(|| CalendarConfig {
                client_id: String::new(),
                client_secret: String::new(),
                refresh_token: String::new(),
                calendar_id: default_calendar_id(),
                time_zone: default_time_zone(),
                api_base_url: default_calendar_api_url(),
                token_url: default_token_url(),
                timeout_secs: default_calendar_timeout(),
            });
            calendar.client_id = client_id;
            calendar.client_secret = client_secret;
            calendar.refresh_token = refresh_token;
        }
        if let Ok(calendar_id) = std::env::var("GOOGLE_CALENDAR_ID") {
            if let Some(ref mut calendar) = self.calendar {
                calendar.calendar_id = calendar_id;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            anyhow::bail!("JWT secret must be at least 32 characters long");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.storage.max_upload_bytes == 0 {
            anyhow::bail!("Maximum upload size cannot be 0");
        }

        if let Some(ref tls) = self.server.tls {
            if !tls.cert_file.exists() {
                anyhow::bail!("TLS certificate file not found: {:?}", tls.cert_file);
            }
            if !tls.key_file.exists() {
                anyhow::bail!("TLS key file not found: {:?}", tls.key_file);
            }
        }

        if let Some(ref calendar) = self.calendar {
            if calendar.client_id.is_empty()
                || calendar.client_secret.is_empty()
                || calendar.refresh_token.is_empty()
            {
                anyhow::bail!("Calendar integration requires client_id, client_secret and refresh_token");
            }
        }

        Ok(())
    }

    /// Directory where resume files are written
    pub fn resume_dir(&self) -> PathBuf {
        self.storage.upload_dir.join("resumes")
    }
}
