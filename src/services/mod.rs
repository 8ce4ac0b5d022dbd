//! Business logic services

pub mod auth;
pub mod calendar;
pub mod commander;
pub mod export;
pub mod hr;
pub mod storage;
pub mod volunteer;

pub use auth::AuthService;
pub use calendar::{CalendarClient, EventTime, InterviewInvitation, ScheduledEvent};
pub use commander::{CommanderService, CsvExport, ResumeDownload};
pub use hr::{CreatedVolunteer, HrService};
pub use storage::ResumeStorage;
pub use volunteer::{ProfileEditor, VolunteerService};
