use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crust_core::{CrustError, RunId};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scratch {
    File(PathBuf),
    Dir(PathBuf),
}

/// Scoped owner of a run's scratch files and directories.
///
/// Everything registered with the guard is removed when it drops, whether the
/// run completed, failed, or unwound through a panic. Removal is best-effort:
/// paths that are already gone are ignored and other failures are logged.
#[derive(Debug)]
pub struct ScratchGuard {
    run_id: RunId,
    entries: Vec<Scratch>,
}

impl ScratchGuard {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            entries: Vec::new(),
        }
    }

    /// Registers `path` and writes `contents` to it. The path is tracked before
    /// the write so a partially written file is still removed.
    pub fn write_file(&mut self, path: &Path, contents: &str) -> Result<(), CrustError> {
        self.entries.push(Scratch::File(path.to_path_buf()));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| CrustError::io("crust_exp.scratch_dir", parent, err))?;
        }
        fs::write(path, contents).map_err(|err| CrustError::io("crust_exp.scratch_write", path, err))
    }

    /// Creates and registers a private directory tree.
    pub fn create_dir(&mut self, path: &Path) -> Result<(), CrustError> {
        self.entries.push(Scratch::Dir(path.to_path_buf()));
        fs::create_dir_all(path).map_err(|err| CrustError::io("crust_exp.scratch_dir", path, err))
    }

    /// Paths currently owned by the guard.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.entries.iter().map(|entry| match entry {
            Scratch::File(path) | Scratch::Dir(path) => path.as_path(),
        })
    }

    fn release(&mut self) {
        for entry in self.entries.drain(..).rev() {
            let (path, result) = match &entry {
                Scratch::File(path) => (path, fs::remove_file(path)),
                Scratch::Dir(path) => (path, fs::remove_dir_all(path)),
            };
            match result {
                Ok(()) => debug!(run_id = %self.run_id, path = %path.display(), "scratch removed"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => warn!(
                    run_id = %self.run_id,
                    path = %path.display(),
                    error = %err,
                    "failed to remove scratch path"
                ),
            }
        }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        self.release();
    }
}
