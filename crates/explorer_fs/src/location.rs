//! Locations and the path resolver
//!
//! A [`Location`] is either a normalized absolute path or the collection
//! root, the sentinel that stands for "all volumes". The [`PathResolver`]
//! turns location-bar text into locations and classifies what is on disk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{NavigationError, TransferError, TransferResult};

/// Label shown for the collection root.
pub const COLLECTION_ROOT_LABEL: &str = "This PC";

/// Tokens that resolve to the collection root (compared case-insensitively).
pub const DEFAULT_ROOT_ALIASES: &[&str] = &[COLLECTION_ROOT_LABEL, "Computer", "My Computer"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    /// Every volume at once. Has no parent.
    CollectionRoot,
    Path(PathBuf),
}

impl Location {
    /// Builds a path location, normalizing it lexically.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Location::Path(normalize(path.as_ref()))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Location::CollectionRoot => None,
            Location::Path(path) => Some(path),
        }
    }

    pub fn is_collection_root(&self) -> bool {
        matches!(self, Location::CollectionRoot)
    }

    /// Volume roots have the collection root as their parent.
    pub fn parent(&self) -> Option<Location> {
        match self {
            Location::CollectionRoot => None,
            Location::Path(path) => Some(
                path.parent()
                    .map(|p| Location::Path(p.to_path_buf()))
                    .unwrap_or(Location::CollectionRoot),
            ),
        }
    }

    /// Name for titles and breadcrumbs.
    pub fn display_name(&self) -> String {
        match self {
            Location::CollectionRoot => COLLECTION_ROOT_LABEL.to_string(),
            Location::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::CollectionRoot => f.write_str(COLLECTION_ROOT_LABEL),
            Location::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::from_path(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::from_path(path)
    }
}

// ============================================================================
// ENTRY KIND - closed set of things a location can point at
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    /// A directory whose parent is the collection root.
    VolumeRoot,
    CollectionRoot,
}

/// Context actions a collaborator may offer for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryAction {
    Open,
    Rename,
    Delete,
    Copy,
    Cut,
    Paste,
    CopyPath,
    CreateFile,
    CreateDirectory,
    Properties,
}

impl EntryKind {
    pub fn actions(self) -> &'static [EntryAction] {
        use EntryAction::*;
        match self {
            EntryKind::File => &[Open, Rename, Delete, Copy, Cut, CopyPath, Properties],
            EntryKind::Directory => &[
                Open,
                Rename,
                Delete,
                Copy,
                Cut,
                Paste,
                CopyPath,
                CreateFile,
                CreateDirectory,
                Properties,
            ],
            EntryKind::VolumeRoot => {
                &[Open, Paste, CopyPath, CreateFile, CreateDirectory, Properties]
            }
            EntryKind::CollectionRoot => &[Open, Properties],
        }
    }

    pub fn allows(self, action: EntryAction) -> bool {
        self.actions().contains(&action)
    }

    /// Whether entries can be listed, pasted or created inside.
    pub fn is_container(self) -> bool {
        match self {
            EntryKind::File => false,
            EntryKind::Directory | EntryKind::VolumeRoot | EntryKind::CollectionRoot => true,
        }
    }
}

/// Classifies an existing path. Symlinks are followed.
pub fn entry_kind(path: &Path) -> io::Result<EntryKind> {
    let metadata = std::fs::metadata(path)?;
    Ok(if !metadata.is_dir() {
        EntryKind::File
    } else if is_volume_root(path) {
        EntryKind::VolumeRoot
    } else {
        EntryKind::Directory
    })
}

pub fn is_volume_root(path: &Path) -> bool {
    path.has_root() && path.parent().is_none()
}

/// Roots of every mounted volume, in a stable order.
#[cfg(windows)]
pub fn volumes() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|root| root.exists())
        .collect()
}

/// Roots of every mounted volume, in a stable order.
#[cfg(not(windows))]
pub fn volumes() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}

/// Lexical normalization: drops `.`, folds `..`, removes duplicate and
/// trailing separators. Does not touch the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut has_root = false;
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => {
                out.push(component.as_os_str());
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !has_root {
                    out.push("..");
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    finish_drive_root(&mut out, has_root);
    out
}

/// "C:" alone names the current directory of the drive; treat it as the root.
#[cfg(windows)]
fn finish_drive_root(out: &mut PathBuf, has_root: bool) {
    let bare_prefix = out.components().count() == 1
        && matches!(out.components().next(), Some(Component::Prefix(_)));
    if !has_root && bare_prefix {
        out.push(std::path::MAIN_SEPARATOR_STR);
    }
}

#[cfg(not(windows))]
fn finish_drive_root(_out: &mut PathBuf, _has_root: bool) {}

#[cfg(windows)]
fn normalize_separators(input: &str) -> String {
    input.replace('/', "\\")
}

#[cfg(not(windows))]
fn normalize_separators(input: &str) -> String {
    input.to_string()
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

// ============================================================================
// PATH RESOLVER
// ============================================================================

/// Turns location-bar input into [`Location`]s.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root_aliases: Vec<String>,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::with_aliases(DEFAULT_ROOT_ALIASES.iter().copied())
    }
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root_aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// True for the empty string and any configured root alias.
    pub fn is_root_token(&self, input: &str) -> bool {
        let input = input.trim();
        input.is_empty()
            || self
                .root_aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(input))
    }

    /// Resolves `input` relative to the process working directory.
    pub fn resolve(&self, input: &str) -> Result<Location, NavigationError> {
        self.resolve_from(input, &Location::CollectionRoot)
    }

    /// Resolves `input`, joining relative paths onto `base`.
    ///
    /// Root tokens never touch the filesystem. Anything else must exist.
    pub fn resolve_from(&self, input: &str, base: &Location) -> Result<Location, NavigationError> {
        if self.is_root_token(input) {
            return Ok(Location::CollectionRoot);
        }

        let trimmed = input.trim();
        let text = normalize_separators(trimmed);
        let raw = match text.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with(std::path::is_separator) => {
                let home = home_dir().ok_or_else(|| NavigationError::NotFound(trimmed.to_string()))?;
                home.join(rest.trim_start_matches(std::path::is_separator))
            }
            _ => PathBuf::from(&text),
        };

        let absolute = if raw.has_root() {
            raw
        } else {
            let base_dir = match base {
                Location::Path(path) => path.clone(),
                Location::CollectionRoot => std::env::current_dir()
                    .map_err(|_| NavigationError::NotFound(trimmed.to_string()))?,
            };
            base_dir.join(raw)
        };

        let normalized = normalize(&absolute);
        if std::fs::metadata(&normalized).is_err() {
            tracing::debug!("Resolver: {:?} does not exist", normalized);
            return Err(NavigationError::NotFound(trimmed.to_string()));
        }
        Ok(Location::Path(normalized))
    }

    /// Classifies a location, re-reading the filesystem.
    pub fn kind_of(&self, location: &Location) -> TransferResult<EntryKind> {
        match location {
            Location::CollectionRoot => Ok(EntryKind::CollectionRoot),
            Location::Path(path) => entry_kind(path).map_err(|e| TransferError::from_io(path, &e)),
        }
    }
}
