//! Clipboard store
//!
//! Presentation state plus an instruction for the transfer engine. Never
//! touches the filesystem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// Paths whose visual state changed because of a clipboard mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardChange {
    pub paths: BTreeSet<PathBuf>,
}

impl ClipboardChange {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClipboardStore {
    entries: Vec<PathBuf>,
    mode: Option<ClipboardMode>,
}

impl ClipboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_copy<I>(&mut self, paths: I) -> ClipboardChange
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.replace(paths, ClipboardMode::Copy)
    }

    pub fn set_cut<I>(&mut self, paths: I) -> ClipboardChange
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.replace(paths, ClipboardMode::Cut)
    }

    /// Empties the store. Reports the paths it used to hold.
    pub fn clear(&mut self) -> ClipboardChange {
        self.mode = None;
        ClipboardChange {
            paths: self.entries.drain(..).collect(),
        }
    }

    /// Drops the given paths, clearing the mode once nothing is left.
    pub fn remove<'a, I>(&mut self, paths: I) -> ClipboardChange
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let doomed: BTreeSet<&Path> = paths.into_iter().collect();
        let mut change = ClipboardChange::default();
        self.entries.retain(|entry| {
            if doomed.contains(entry.as_path()) {
                change.paths.insert(entry.clone());
                false
            } else {
                true
            }
        });
        if self.entries.is_empty() {
            self.mode = None;
        }
        change
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|entry| entry == path)
    }

    /// Renderer query: should `path` be drawn grayed out.
    pub fn is_cut(&self, path: &Path) -> bool {
        self.mode == Some(ClipboardMode::Cut) && self.contains(path)
    }

    pub fn mode(&self) -> Option<ClipboardMode> {
        self.mode
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn replace<I>(&mut self, paths: I, mode: ClipboardMode) -> ClipboardChange
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut change = self.clear();
        for path in paths {
            if !self.entries.contains(&path) {
                change.paths.insert(path.clone());
                self.entries.push(path);
            }
        }
        self.mode = (!self.entries.is_empty()).then_some(mode);
        tracing::debug!("Clipboard now holds {} item(s) as {:?}", self.entries.len(), self.mode);
        change
    }
}
