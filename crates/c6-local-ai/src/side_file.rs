//! Auxiliary files that an inference backend expects next to the executable.
//!
//! llama.cpp's Metal backend looks up `ggml-metal.metal` in the directory of
//! the running binary. The file only has to exist while a model is loaded.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::LocalAIError;

/// File name the Metal backend looks for.
pub const METAL_SHADER_FILENAME: &str = "ggml-metal.metal";

/// A file written for the duration of a scope. Removed on drop unless it
/// was already there.
#[derive(Debug)]
pub struct SideFile {
    path: PathBuf,
    owned: bool,
}

impl SideFile {
    /// Write `contents` to `dir/name`. An existing file is left untouched.
    pub fn materialize(dir: &Path, name: &str, contents: &[u8]) -> Result<Self, LocalAIError> {
        let path = dir.join(name);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Using existing {:?}", path);
                return Ok(Self { path, owned: false });
            }
            Err(e) => return Err(e.into()),
        };

        // Owned from here on, so a failed write removes the partial file.
        let side_file = Self { path, owned: true };
        file.write_all(contents)?;
        debug!("Materialized {:?}", side_file.path);
        Ok(side_file)
    }

    /// Copy `source` next to the running executable as `name`.
    pub fn beside_executable(source: &Path, name: &str) -> Result<Self, LocalAIError> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        let contents = fs::read(source)?;
        Self::materialize(dir, name, &contents)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SideFile {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed {:?}", self.path),
            Err(e) => warn!("Cannot remove {:?}: {}", self.path, e),
        }
    }
}
