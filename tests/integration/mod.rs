//! Integration tests for the volunteer portal
//!
//! These tests drive the full router, middleware included, against a
//! temporary SQLite database.

mod calendar_tests;
mod commander_tests;
mod hr_tests;
mod volunteer_tests;
