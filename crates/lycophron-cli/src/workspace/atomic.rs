//! Crash-safe replacement of the project files: `config/settings.toml`,
//! which may hold the access token, and `data/records.json`, which is
//! rewritten after every load and publish batch. A reader sees either the
//! previous file or the new one, never a partial write.

use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{WorkspaceError, WorkspaceResult};

/// Who may read a file written by [`write_bytes_atomic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccess {
    /// Default permissions for new files.
    Shared,
    /// Owner read/write only, applied before any byte is written.
    Private,
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> WorkspaceResult<()> {
    let data = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &data, FileAccess::Shared)
}

/// Replace `path` with `data` through a synced temporary sibling file.
pub fn write_bytes_atomic(path: &Path, data: &[u8], access: FileAccess) -> WorkspaceResult<()> {
    let parent = non_empty_parent(path);
    if let Some(parent) = parent {
        create_dir_all(parent)?;
    }

    let tmp_path = sibling_tmp_path(path)?;
    {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&tmp_path)?;
        if access == FileAccess::Private {
            restrict_to_owner(&file)?;
        }
        file.write_all(data)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = parent {
        sync_dir(parent)?;
    }

    Ok(())
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

/// Hidden sibling in the same directory, so the rename never crosses a
/// filesystem boundary.
fn sibling_tmp_path(path: &Path) -> WorkspaceResult<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| WorkspaceError::Invalid(format!("not a file path: {}", path.display())))?;
    Ok(path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy())))
}

#[cfg(unix)]
fn restrict_to_owner(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
