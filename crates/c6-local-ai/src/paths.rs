//! Path utilities for the c6 data directory.

use std::path::{Path, PathBuf};

use crate::error::LocalAIError;
use crate::{DEFAULT_DATABASE_FILENAME, DEFAULT_MODEL_FILENAME};

/// Get the default c6 data directory (~/.c6/).
pub fn c6_data_dir() -> Result<PathBuf, LocalAIError> {
    dirs::home_dir()
        .map(|home| home.join(".c6"))
        .ok_or(LocalAIError::HomeDirNotFound)
}

/// Get the default database path inside `dir`.
pub fn database_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_DATABASE_FILENAME)
}

/// Get the default model path inside `dir`.
pub fn model_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_MODEL_FILENAME)
}

/// Path of the temporary file an artifact is written to before it is moved into place.
pub fn temp_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Path of the lock file that guards `update` inside `dir`.
pub fn update_lock_path(dir: &Path) -> PathBuf {
    dir.join("update.lock")
}

/// Ensure the directory that will contain `path` exists.
pub fn ensure_parent_dir(path: &Path) -> Result<(), LocalAIError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    std::fs::create_dir_all(parent).map_err(|source| LocalAIError::DataDirCreationFailed {
        path: parent.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let dir = Path::new("/home/someone/.c6");
        assert_eq!(database_path(dir), dir.join("c6.db"));
        assert_eq!(
            model_path(dir),
            dir.join("codellama-7b-instruct.Q4_K_M.gguf")
        );
        assert_eq!(update_lock_path(dir), dir.join("update.lock"));
    }

    #[test]
    fn test_temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/tmp/c6/c6.db")),
            PathBuf::from("/tmp/c6/c6.db.tmp")
        );
    }

    #[test]
    fn test_ensure_parent_dir_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("c6.db");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn test_ensure_parent_dir_accepts_bare_filename() {
        ensure_parent_dir(Path::new("c6.db")).unwrap();
    }
}
