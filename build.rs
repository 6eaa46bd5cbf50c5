//! Rebuilds the crate whenever a migration under `migrations/` changes.
//!
//! `embed_migrations!` reads the SQL files at compile time, which Cargo does
//! not track on its own.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
