//! Explorer settings
//
// Persisted as TOML at `<config dir>/explorer.toml`. A missing or unreadable
// file never stops the explorer from starting: defaults are used instead.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use explorer_fs::{ListingOptions, PathResolver, SearchOptions, SortBy, SortOrder, DEFAULT_ROOT_ALIASES};

pub const SETTINGS_FILE: &str = "explorer.toml";

/// Directories used by the explorer, resolved once from the platform.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "Explorer", "Explorer")
}

/// A user-added shortcut as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedEntry {
    pub label: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    pub show_hidden: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Prefer the recycle bin over permanent deletion.
    pub use_trash: bool,
    /// Location-bar tokens that mean the collection root.
    pub root_aliases: Vec<String>,
    pub search: SearchOptions,
    pub pinned: Vec<PinnedEntry>,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            show_hidden: false,
            sort_by: SortBy::Name,
            sort_order: SortOrder::Ascending,
            use_trash: true,
            root_aliases: DEFAULT_ROOT_ALIASES.iter().map(|s| s.to_string()).collect(),
            search: SearchOptions::default(),
            pinned: Vec::new(),
        }
    }
}

impl ExplorerSettings {
    /// `<config dir>/explorer.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Loads settings, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Falling back to default settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse settings file {:?}", path))
    }

    /// Writes the settings, creating the config directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, contents).with_context(|| format!("Failed to write settings file {:?}", path))?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn listing_options(&self) -> ListingOptions {
        ListingOptions {
            show_hidden: self.show_hidden,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }

    pub fn resolver(&self) -> PathResolver {
        PathResolver::with_aliases(self.root_aliases.iter().cloned())
    }
}
