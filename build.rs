//! Build script for volunteer-portal
//!
//! Migrations are embedded with `sqlx::migrate!`, which does not track new
//! files on its own.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
