//! Common test utilities and helpers
//!
//! - Test application with a temporary SQLite database
//! - Factories for request payloads
//! - Mock calendar API

pub mod factories;
pub mod mocks;

pub use factories::*;
pub use mocks::*;
pub use test_app::*;
