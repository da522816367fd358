//! Recursive copy and removal helpers.
//!
//! Directory copies are not atomic: a failure part way through leaves the
//! already copied part of the tree on disk.

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{TransferError, TransferResult};

/// Copies a file or a whole directory tree from `src` to `dst`.
///
/// Symlinks are followed. A link that leads back into one of its own
/// ancestors is skipped instead of copied forever, and so is a dangling link.
pub(crate) fn copy_entry(src: &Path, dst: &Path) -> TransferResult<()> {
    let metadata = fs::metadata(src).map_err(|e| TransferError::from_io(src, &e))?;
    if !metadata.is_dir() {
        fs::copy(src, dst).map_err(|e| TransferError::from_io(src, &e))?;
        return Ok(());
    }
    copy_tree(src, dst)
}

fn copy_tree(src: &Path, dst: &Path) -> TransferResult<()> {
    let walker = WalkDir::new(src)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.loop_ancestor().is_some() => {
                tracing::debug!("Skipping symlink cycle at {:?}", err.path());
                continue;
            }
            Err(err) if is_dangling_link(&err) => {
                tracing::warn!("Skipping dangling symlink {:?}", err.path());
                continue;
            }
            Err(err) => {
                let path = err.path().unwrap_or(src).to_path_buf();
                return Err(match err.into_io_error() {
                    Some(io_err) => TransferError::from_io(&path, &io_err),
                    None => TransferError::invalid_target(&path, "unreadable directory entry"),
                });
            }
        };

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| TransferError::invalid_target(entry.path(), "escaped the source tree"))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| TransferError::from_io(&target, &e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| TransferError::from_io(entry.path(), &e))?;
        }
    }
    Ok(())
}

fn is_dangling_link(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
    not_found
        && err
            .path()
            .and_then(|p| fs::symlink_metadata(p).ok())
            .is_some_and(|m| m.file_type().is_symlink())
}

/// Removes `path` for good. Directories go recursively; a symlink is removed
/// itself, never its target.
pub(crate) fn remove_permanently(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Whether a rename failed only because source and destination live on
/// different volumes.
pub(crate) fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = 18; // EXDEV
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17; // ERROR_NOT_SAME_DEVICE
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: i32 = -1;

    err.raw_os_error() == Some(CROSS_DEVICE)
}
