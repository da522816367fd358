//! Recursive name search
//!
//! Depth-first under a scope, folders before files at every level,
//! case-insensitive substring match on entry names. Every folder is
//! descended whether or not it matched.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

use crate::listing::FileType;
use crate::utils::{format_file_size, format_modified_time, is_hidden_name};

/// One hit. Regenerated on every search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// `None` for folders.
    pub size: Option<u64>,
    pub type_label: String,
    pub modified: Option<SystemTime>,
}

impl SearchResult {
    fn from_entry(entry: &DirEntry) -> Self {
        let is_dir = entry.file_type().is_dir();
        let metadata = entry.metadata().ok();
        SearchResult {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path().to_path_buf(),
            is_dir,
            size: if is_dir { None } else { metadata.as_ref().map(|m| m.len()) },
            type_label: FileType::from_path(entry.path(), is_dir).display_name().to_string(),
            modified: metadata.and_then(|m| m.modified().ok()),
        }
    }

    /// Empty for folders.
    pub fn size_text(&self) -> String {
        self.size.map(format_file_size).unwrap_or_default()
    }

    pub fn modified_text(&self) -> String {
        format_modified_time(self.modified)
    }

    /// The folder the result lives in.
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Levels below the scope; `None` is unbounded.
    pub max_depth: Option<usize>,
    pub max_results: Option<usize>,
    pub include_hidden: bool,
    pub follow_links: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_results: None,
            include_hidden: true,
            follow_links: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    options: SearchOptions,
}

impl SearchEngine {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Lazily walks `scope`. The query is matched as given, surrounding
    /// whitespace included. An empty query matches nothing.
    pub fn search(&self, query: &str, scope: &Path) -> SearchIter {
        let needle = query.to_lowercase();

        let mut walker = WalkDir::new(scope)
            .min_depth(1)
            .follow_links(self.options.follow_links)
            .sort_by(folders_first);
        if let Some(depth) = self.options.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.options.include_hidden;
        let inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send> = Box::new(
            walker
                .into_iter()
                .filter_entry(move |entry| entry.depth() == 0 || include_hidden || !is_hidden_entry(entry)),
        );

        tracing::debug!("Searching {:?} for {:?}", scope, needle);
        SearchIter {
            inner,
            needle,
            remaining: self.options.max_results,
        }
    }
}

fn folders_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.file_type()
        .is_dir()
        .cmp(&a.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_hidden_entry(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(is_hidden_name)
}

/// Finite and not restartable. Unreadable entries and symlink cycles are
/// skipped.
pub struct SearchIter {
    inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>,
    needle: String,
    remaining: Option<usize>,
}

impl Iterator for SearchIter {
    type Item = SearchResult;

    fn next(&mut self) -> Option<SearchResult> {
        if self.needle.is_empty() || self.remaining == Some(0) {
            return None;
        }
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    if err.loop_ancestor().is_some() {
                        tracing::debug!("Search skipped symlink cycle at {:?}", err.path());
                    } else {
                        tracing::debug!("Search skipped unreadable entry: {}", err);
                    }
                    continue;
                }
            };

            if entry.file_name().to_string_lossy().to_lowercase().contains(&self.needle) {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Some(SearchResult::from_entry(&entry));
            }
        }
    }
}
