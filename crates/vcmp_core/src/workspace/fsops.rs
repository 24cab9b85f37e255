//! File moves and folder housekeeping.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{WorkspaceError, WorkspaceResult};

/// Move `src` into `dest_dir`, keeping its file name.
///
/// The source must exist and the destination must not. `dest_dir` is created
/// if needed. Falls back to copy-and-remove when a rename crosses
/// filesystems. Returns the new path.
pub fn move_file(src: &Path, dest_dir: &Path) -> WorkspaceResult<PathBuf> {
    if !src.exists() {
        return Err(WorkspaceError::NotFound(src.to_path_buf()));
    }
    if !src.is_file() {
        return Err(WorkspaceError::NotAFile(src.to_path_buf()));
    }

    let file_name = src
        .file_name()
        .ok_or_else(|| WorkspaceError::NotAFile(src.to_path_buf()))?;
    let dest = dest_dir.join(file_name);
    rename_file(src, &dest)?;
    Ok(dest)
}

/// Rename `src` to exactly `dest`, refusing to overwrite.
pub(crate) fn rename_file(src: &Path, dest: &Path) -> WorkspaceResult<()> {
    if !src.exists() {
        return Err(WorkspaceError::NotFound(src.to_path_buf()));
    }
    if dest.exists() {
        return Err(WorkspaceError::DestinationExists(dest.to_path_buf()));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| WorkspaceError::io("creating", parent, e))?;
    }

    match fs::rename(src, dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!("Rename crosses devices, copying {}", src.display());
            fs::copy(src, dest).map_err(|e| WorkspaceError::io("copying", src, e))?;
            fs::remove_file(src).map_err(|e| WorkspaceError::io("removing", src, e))?;
        }
        Err(e) => return Err(WorkspaceError::io("moving", src, e)),
    }

    tracing::debug!("Moved {} -> {}", src.display(), dest.display());
    Ok(())
}

/// Return `base` if it is free, otherwise the first free `base (n)`.
pub fn unique_dir(base: &Path) -> PathBuf {
    if !base.exists() {
        return base.to_path_buf();
    }

    let name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (2..)
        .map(|n| base.with_file_name(format!("{} ({})", name, n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| base.to_path_buf())
}

/// Delete a folder and everything in it. Missing folders are not an error.
pub fn remove_tree(dir: &Path) -> WorkspaceResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WorkspaceError::io("removing", dir, e)),
    }
}
