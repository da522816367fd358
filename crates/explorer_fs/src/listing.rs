//! Directory listing
//!
//! Every call reads the directory fresh from disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{TransferError, TransferResult};
use crate::location::{entry_kind, volumes, EntryKind, Location};
use crate::utils::{format_file_size, format_modified_time, is_hidden_name};

// ============================================================================
// ENUMS - File categories, sort options
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Volume,
    Folder,
    Code,     // .rs, .c, .cpp, .py, ...
    Config,   // .toml, .ini, .json, .yaml
    Database, // .db, .sqlite, .sqlite3 files
    Image,    // .png, .jpg, .jpeg, .gif, .bmp, .svg
    Audio,    // .wav, .mp3, .ogg, .flac
    Video,    // .mp4, .webm, .avi, .mkv
    Document, // .txt, .md, .pdf, .docx
    Archive,  // .zip, .tar, .gz, .7z
    Executable,
    Other,
}

impl FileType {
    pub fn from_path(path: &Path, is_dir: bool) -> Self {
        if is_dir {
            return if crate::location::is_volume_root(path) {
                FileType::Volume
            } else {
                FileType::Folder
            };
        }

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("rs" | "c" | "h" | "cpp" | "hpp" | "py" | "js" | "ts" | "go" | "java") => FileType::Code,
            Some("toml" | "ini" | "json" | "yaml" | "yml" | "cfg") => FileType::Config,
            Some("db" | "sqlite" | "sqlite3") => FileType::Database,
            Some("png" | "jpg" | "jpeg" | "gif" | "bmp" | "svg" | "webp") => FileType::Image,
            Some("wav" | "mp3" | "ogg" | "flac") => FileType::Audio,
            Some("mp4" | "webm" | "avi" | "mkv" | "mov") => FileType::Video,
            Some("txt" | "md" | "pdf" | "doc" | "docx" | "log") => FileType::Document,
            Some("zip" | "tar" | "gz" | "7z" | "rar" | "xz") => FileType::Archive,
            Some("exe" | "msi" | "bat" | "sh" | "appimage") => FileType::Executable,
            _ => FileType::Other,
        }
    }

    /// Label for the "Type" column.
    pub fn display_name(&self) -> &'static str {
        match self {
            FileType::Volume => "Local Disk",
            FileType::Folder => "File Folder",
            FileType::Code => "Source Code",
            FileType::Config => "Config",
            FileType::Database => "Database",
            FileType::Image => "Image",
            FileType::Audio => "Audio",
            FileType::Video => "Video",
            FileType::Document => "Document",
            FileType::Archive => "Archive",
            FileType::Executable => "Application",
            FileType::Other => "File",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Name,
    Modified,
    Size,
    Type,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

// ============================================================================
// FILE ITEM - Represents a file or folder in the file system
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    pub file_type: FileType,
    /// Zero for folders.
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl FileItem {
    /// Reads metadata for `path`. `None` if the entry vanished or its name is
    /// not valid UTF-8.
    pub fn from_path(path: &Path) -> Option<Self> {
        let kind = entry_kind(path).ok()?;
        let name = match path.file_name() {
            Some(name) => name.to_str()?.to_string(),
            None => path.display().to_string(),
        };
        let is_dir = kind.is_container();

        let metadata = std::fs::metadata(path).ok();
        let size = if is_dir {
            0
        } else {
            metadata.as_ref().map(|m| m.len()).unwrap_or(0)
        };
        let modified = metadata.and_then(|m| m.modified().ok());

        Some(FileItem {
            path: path.to_path_buf(),
            name,
            kind,
            file_type: FileType::from_path(path, is_dir),
            size,
            modified,
        })
    }

    pub fn is_folder(&self) -> bool {
        self.kind.is_container()
    }

    /// Empty for folders.
    pub fn size_text(&self) -> String {
        if self.is_folder() {
            String::new()
        } else {
            format_file_size(self.size)
        }
    }

    pub fn modified_text(&self) -> String {
        format_modified_time(self.modified)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListingOptions {
    pub show_hidden: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

/// Lists `location`, folders first. The collection root lists the volumes.
pub fn list_directory(location: &Location, options: &ListingOptions) -> TransferResult<Vec<FileItem>> {
    let dir = match location {
        Location::CollectionRoot => {
            return Ok(volumes().iter().filter_map(|v| FileItem::from_path(v)).collect());
        }
        Location::Path(dir) => dir,
    };

    let entries = std::fs::read_dir(dir).map_err(|e| TransferError::from_io(dir, &e))?;
    let mut items: Vec<FileItem> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();

            // Filter hidden files
            if !options.show_hidden {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if is_hidden_name(name) {
                        return None;
                    }
                }
            }

            FileItem::from_path(&path)
        })
        .collect();

    sort_items(&mut items, options.sort_by, options.sort_order);
    Ok(items)
}

pub fn sort_items(items: &mut [FileItem], sort_by: SortBy, sort_order: SortOrder) {
    items.sort_by(|a, b| {
        let cmp = match sort_by {
            SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortBy::Modified => a.modified.cmp(&b.modified),
            SortBy::Size => a.size.cmp(&b.size),
            SortBy::Type => a.file_type.display_name().cmp(b.file_type.display_name()),
        };

        match sort_order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });

    // Folders first
    items.sort_by_key(|item| !item.is_folder());
}
