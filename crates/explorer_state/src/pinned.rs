//! Pinned shortcuts resolved from the host environment at startup.

use directories::UserDirs;
use std::path::Path;

use explorer_fs::{Location, PinnedLocation};

use crate::settings::ExplorerSettings;

/// The usual user folders that exist on this machine, home first.
pub fn default_pinned() -> Vec<PinnedLocation> {
    let Some(dirs) = UserDirs::new() else {
        tracing::warn!("Could not determine user directories; no default shortcuts");
        return Vec::new();
    };

    let candidates: [(&str, Option<&Path>); 7] = [
        ("Home", Some(dirs.home_dir())),
        ("Desktop", dirs.desktop_dir()),
        ("Documents", dirs.document_dir()),
        ("Downloads", dirs.download_dir()),
        ("Pictures", dirs.picture_dir()),
        ("Music", dirs.audio_dir()),
        ("Videos", dirs.video_dir()),
    ];

    candidates
        .into_iter()
        .filter_map(|(label, path)| Some(PinnedLocation::new(label, path?)))
        .collect()
}

/// Defaults followed by the user's own shortcuts. Missing folders and
/// duplicate locations are dropped.
pub fn pinned_locations(settings: &ExplorerSettings) -> Vec<PinnedLocation> {
    let user = settings
        .pinned
        .iter()
        .map(|entry| PinnedLocation::new(entry.label.clone(), entry.path.as_path()));
    collect_pinned(default_pinned().into_iter().chain(user))
}

fn collect_pinned(candidates: impl Iterator<Item = PinnedLocation>) -> Vec<PinnedLocation> {
    let mut pinned: Vec<PinnedLocation> = Vec::new();
    for pin in candidates {
        let exists = match &pin.location {
            Location::CollectionRoot => true,
            Location::Path(path) => path.is_dir(),
        };
        if !exists {
            tracing::debug!("Skipping pinned location {} ({})", pin.label, pin.location);
            continue;
        }
        if pinned.iter().any(|p| p.location == pin.location) {
            continue;
        }
        pinned.push(pin);
    }
    pinned
}
