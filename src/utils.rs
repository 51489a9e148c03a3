//! Shared helpers for locating the database file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Gets the cross-platform default database path.
///
/// Returns the path as `{data_dir}/hashtags/hashtags.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// Returns `None` if the data directory cannot be determined.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("hashtags").join("hashtags.db"))
}

/// Ensures the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_database_path_points_into_app_dir() {
        if let Some(path) = default_database_path() {
            assert!(path.to_string_lossy().contains("hashtags"));
            assert!(path.ends_with("hashtags.db"));
        }
    }

    #[test]
    fn ensure_database_directory_creates_parents() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("a").join("b").join("tags.db");

        ensure_database_directory(&db_path).unwrap();

        assert!(db_path.parent().unwrap().is_dir());
    }
}
