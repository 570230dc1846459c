//! Mutual exclusion for `update`.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::LocalAIError;
use crate::paths::update_lock_path;

/// Lock file held for the duration of an update. Released on drop.
#[derive(Debug)]
pub struct UpdateLock {
    path: PathBuf,
}

impl UpdateLock {
    /// Take the update lock in `dir`, creating the directory if needed.
    ///
    /// Fails with [`LocalAIError::UpdateInProgress`] if the lock file exists.
    pub fn acquire(dir: &Path) -> Result<Self, LocalAIError> {
        fs::create_dir_all(dir).map_err(|source| LocalAIError::DataDirCreationFailed {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = update_lock_path(dir);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                debug!("Acquired update lock {:?}", path);
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(LocalAIError::UpdateInProgress(path))
            }
            Err(e) => Err(LocalAIError::Io(e)),
        }
    }

    /// Location of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UpdateLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Cannot remove update lock {:?}: {}", self.path, e);
        }
    }
}
