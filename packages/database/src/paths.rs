#![allow(clippy::module_name_repetitions)]
//! Default file locations for the `DuckDB` database.
//!
//! Paths are relative to the working directory the server is started
//! from.

use std::path::{Path, PathBuf};

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Returns the default path of the application database.
#[must_use]
pub fn default_database_path() -> PathBuf {
    data_dir().join("rth_map.duckdb")
}

/// Ensures a directory exists, creating it if necessary.
///
/// An empty path (a bare file name's parent) is treated as the current
/// directory.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
