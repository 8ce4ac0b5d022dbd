//! Volunteer Portal library
//!
//! Backend of a volunteer recruitment portal: volunteers apply to job
//! postings, commanders run the selection pipeline, HR staff hire.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser, Claims};
use services::{CalendarClient, ResumeStorage};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Calendar client (optional)
    pub calendar: Option<Arc<CalendarClient>>,
    /// Resume file storage
    pub storage: ResumeStorage,
}

impl AppState {
    /// Build the state, creating the calendar client when configured
    pub fn new(config: AppConfig, db: DbPool) -> anyhow::Result<Self> {
        let calendar = match &config.calendar {
            Some(calendar) => Some(Arc::new(CalendarClient::new(calendar)?)),
            None => None,
        };
        let storage = ResumeStorage::new(&config);
        Ok(Self {
            config,
            db,
            calendar,
            storage,
        })
    }
}
