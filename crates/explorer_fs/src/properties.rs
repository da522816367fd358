//! Entry properties for the "Properties" action.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::error::{TransferError, TransferResult};
use crate::listing::FileType;
use crate::location::{entry_kind, volumes, EntryKind, Location};
use crate::utils::{format_file_size, format_modified_time};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryProperties {
    pub name: String,
    /// `None` for the collection root.
    pub path: Option<PathBuf>,
    pub kind: EntryKind,
    pub type_label: String,
    /// Total bytes of all files below a folder.
    pub size: u64,
    pub files: usize,
    pub folders: usize,
    pub modified: Option<SystemTime>,
    pub read_only: bool,
}

impl EntryProperties {
    /// Reads properties fresh from disk. Folder sizes are summed recursively;
    /// volume roots only count their direct children.
    pub fn read(location: &Location) -> TransferResult<Self> {
        let path = match location {
            Location::CollectionRoot => {
                return Ok(Self {
                    name: location.display_name(),
                    path: None,
                    kind: EntryKind::CollectionRoot,
                    type_label: "System Folder".to_string(),
                    size: 0,
                    files: 0,
                    folders: volumes().len(),
                    modified: None,
                    read_only: true,
                });
            }
            Location::Path(path) => path,
        };

        let kind = entry_kind(path).map_err(|e| TransferError::from_io(path, &e))?;
        let metadata = std::fs::metadata(path).map_err(|e| TransferError::from_io(path, &e))?;

        let mut properties = Self {
            name: location.display_name(),
            path: Some(path.clone()),
            kind,
            type_label: FileType::from_path(path, kind.is_container()).display_name().to_string(),
            size: 0,
            files: 0,
            folders: 0,
            modified: metadata.modified().ok(),
            read_only: metadata.permissions().readonly(),
        };

        match kind {
            EntryKind::File => properties.size = metadata.len(),
            EntryKind::Directory => properties.tally(WalkDir::new(path).min_depth(1)),
            EntryKind::VolumeRoot => properties.tally(WalkDir::new(path).min_depth(1).max_depth(1)),
            EntryKind::CollectionRoot => {}
        }
        Ok(properties)
    }

    fn tally(&mut self, walker: WalkDir) {
        // Unreadable entries are left out of the totals.
        for entry in walker.into_iter().filter_map(Result::ok) {
            if entry.file_type().is_dir() {
                self.folders += 1;
            } else {
                self.files += 1;
                self.size += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
    }

    pub fn size_text(&self) -> String {
        format_file_size(self.size)
    }

    pub fn modified_text(&self) -> String {
        format_modified_time(self.modified)
    }
}
