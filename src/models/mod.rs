//! Data models

mod application;
mod auth;
mod commander;
mod hr;
mod interview;
mod job;
mod resume;
mod user;
mod volunteer;

pub use application::*;
pub use auth::*;
pub use commander::*;
pub use hr::*;
pub use interview::*;
pub use job::*;
pub use resume::*;
pub use user::*;
pub use volunteer::*;
