//! Shared test utilities.

use std::io;

use tempfile::TempDir;

/// Creates a temporary directory for database tests.
///
/// # Errors
///
/// Returns an error if the temporary directory cannot be created.
pub fn create_temp_dir() -> io::Result<TempDir> {
    TempDir::new()
}

/// Path of a `SQLite` file inside `temp_dir`, as a database URL.
pub fn database_url_in(temp_dir: &TempDir, file_name: &str) -> String {
    temp_dir.path().join(file_name).to_string_lossy().to_string()
}
