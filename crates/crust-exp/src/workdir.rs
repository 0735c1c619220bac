use std::fs;
use std::path::{Path, PathBuf};

use crust_core::errors::{CrustError, ErrorInfo};
use tracing::debug;

use crate::config::ArtifactLayout;

/// Populates `target` so the solver can run there as if it were `base`.
///
/// Every top-level entry of `base` is linked into `target`, except:
/// - directories on the way to `layout.output` are recreated as real
///   directories whose own entries are linked, so the output file lands in
///   `target` and never in the shared tree;
/// - the output file itself is skipped, so a stale copy is never visible;
/// - `layout.private_dirs` are created empty;
/// - the scratch directory is skipped when it lives inside `base`.
///
/// On unix entries are symlinks; elsewhere they are copied.
pub fn mirror_workdir(
    base: &Path,
    target: &Path,
    layout: &ArtifactLayout,
) -> Result<(), CrustError> {
    let base = fs::canonicalize(base)
        .map_err(|err| CrustError::io("crust_exp.workdir_base", base, err))?;
    let scratch = fs::canonicalize(&layout.scratch_dir).ok();
    let mirror = Mirror {
        layout,
        scratch: scratch.as_deref(),
    };
    mirror.populate(&base, target, Path::new(""))?;
    for dir in &layout.private_dirs {
        create_dir(&target.join(dir))?;
    }
    if let Some(parent) = layout.output.parent() {
        create_dir(&target.join(parent))?;
    }
    Ok(())
}

struct Mirror<'a> {
    layout: &'a ArtifactLayout,
    scratch: Option<&'a Path>,
}

impl Mirror<'_> {
    fn populate(&self, src: &Path, dst: &Path, rel: &Path) -> Result<(), CrustError> {
        let entries =
            fs::read_dir(src).map_err(|err| CrustError::io("crust_exp.workdir_read", src, err))?;
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| CrustError::io("crust_exp.workdir_read", src, err))?;
            paths.push(entry.path());
        }
        paths.sort();
        for path in paths {
            let Some(name) = path.file_name() else {
                continue;
            };
            let rel_path = rel.join(name);
            let target = dst.join(name);
            if rel_path == self.layout.output || Some(path.as_path()) == self.scratch {
                continue;
            }
            if self.layout.private_dirs.iter().any(|dir| *dir == rel_path) {
                create_dir(&target)?;
            } else if self.layout.output.starts_with(&rel_path) && path.is_dir() {
                create_dir(&target)?;
                self.populate(&path, &target, &rel_path)?;
            } else {
                link(&path, &target)?;
            }
        }
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), CrustError> {
    fs::create_dir_all(path).map_err(|err| CrustError::io("crust_exp.workdir_dir", path, err))
}

fn link_error(src: &Path, dst: &Path, err: impl ToString) -> CrustError {
    CrustError::Run(
        ErrorInfo::new("crust_exp.workdir_link", err.to_string())
            .with_path(src)
            .with_context("target", dst.display().to_string()),
    )
}

#[cfg(unix)]
fn link(src: &Path, dst: &Path) -> Result<(), CrustError> {
    debug!(src = %src.display(), dst = %dst.display(), "linking into isolated workdir");
    std::os::unix::fs::symlink(src, dst).map_err(|err| link_error(src, dst, err))
}

#[cfg(not(unix))]
fn link(src: &Path, dst: &Path) -> Result<(), CrustError> {
    debug!(src = %src.display(), dst = %dst.display(), "copying into isolated workdir");
    if !src.is_dir() {
        return fs::copy(src, dst)
            .map(|_| ())
            .map_err(|err| link_error(src, dst, err));
    }
    for entry in walkdir::WalkDir::new(src) {
        let entry = entry.map_err(|err| link_error(src, dst, err))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| link_error(src, dst, err))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            create_dir(&target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|err| link_error(entry.path(), &target, err))?;
        }
    }
    Ok(())
}
