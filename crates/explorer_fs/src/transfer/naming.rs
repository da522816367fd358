//! Name validation and unique-name synthesis.

use std::path::{Path, PathBuf};

use crate::error::{TransferError, TransferResult};

/// Characters rejected in any new or renamed entry name.
pub const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Checks a user-supplied entry name. Never touches the filesystem.
pub fn validate_name(name: &str) -> TransferResult<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(FORBIDDEN_CHARS)
        || name.chars().any(char::is_control);
    if invalid {
        return Err(TransferError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Splits `report.txt` into (`report`, Some(`txt`)). Dot-files and names
/// without a dot keep no extension.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(dot) => (&name[..dot], Some(&name[dot + 1..])),
    }
}

/// The `n`th candidate for `name`: `base_n.ext` for files, `name_n` for
/// directories.
pub fn numbered_name(name: &str, n: u64, is_dir: bool) -> String {
    if is_dir {
        return format!("{name}_{n}");
    }
    match split_extension(name) {
        (base, Some(ext)) => format!("{base}_{n}.{ext}"),
        (base, None) => format!("{base}_{n}"),
    }
}

/// Yields `dir/name_1`, `dir/name_2`, ... Numbers strictly increase and are
/// never repeated, so callers that retry after a race keep making progress.
#[derive(Debug, Clone)]
pub struct UniqueNames<'a> {
    dir: &'a Path,
    name: &'a str,
    is_dir: bool,
    next: u64,
}

impl<'a> UniqueNames<'a> {
    pub fn new(dir: &'a Path, name: &'a str, is_dir: bool) -> Self {
        Self {
            dir,
            name,
            is_dir,
            next: 1,
        }
    }
}

impl Iterator for UniqueNames<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let candidate = self.dir.join(numbered_name(self.name, self.next, self.is_dir));
        self.next = self.next.checked_add(1)?;
        Some(candidate)
    }
}

/// True if anything, including a dangling symlink, occupies `path`.
pub(crate) fn occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// First numbered candidate under `dir` that does not exist yet.
pub fn unique_name(dir: &Path, name: &str, is_dir: bool) -> PathBuf {
    UniqueNames::new(dir, name, is_dir)
        .find(|candidate| !occupied(candidate))
        .unwrap_or_else(|| dir.join(numbered_name(name, u64::MAX, is_dir)))
}

/// `dir/name` if free, otherwise the first free numbered candidate.
pub fn available_name(dir: &Path, name: &str, is_dir: bool) -> PathBuf {
    let direct = dir.join(name);
    if occupied(&direct) {
        unique_name(dir, name, is_dir)
    } else {
        direct
    }
}
