//! Conflict prompts and per-item transfer plans.

use std::path::PathBuf;

/// An existing entry blocks a copy or move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub source: PathBuf,
    /// The occupied destination path.
    pub destination: PathBuf,
    pub source_is_dir: bool,
    pub destination_is_dir: bool,
}

impl Conflict {
    /// One-line description suitable for a prompt.
    pub fn describe(&self) -> String {
        let what = if self.destination_is_dir { "folder" } else { "file" };
        format!(
            "A {what} named '{}' already exists in {}",
            self.destination
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            self.destination
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictChoice {
    Overwrite,
    Rename,
    Cancel,
}

/// Asked synchronously, once per conflicting item, before the engine moves
/// past the conflict.
pub trait ConflictResolver {
    fn resolve_conflict(&mut self, conflict: &Conflict) -> ConflictChoice;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&Conflict) -> ConflictChoice,
{
    fn resolve_conflict(&mut self, conflict: &Conflict) -> ConflictChoice {
        self(conflict)
    }
}

/// Answers every conflict the same way.
#[derive(Debug, Clone, Copy)]
pub struct Always(pub ConflictChoice);

impl ConflictResolver for Always {
    fn resolve_conflict(&mut self, _conflict: &Conflict) -> ConflictChoice {
        self.0
    }
}

/// Whether a batch copies or moves its sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferMode {
    Copy,
    Move,
}

impl TransferMode {
    pub fn past_tense(self) -> &'static str {
        match self {
            TransferMode::Copy => "copied",
            TransferMode::Move => "moved",
        }
    }
}

/// The decision for one source item of a paste. Computed once, executed
/// once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPlan {
    Copy { to: PathBuf },
    Move { to: PathBuf },
    /// The item already sits at its destination.
    SkipIdentical,
    /// Destination was taken; proceed under a synthesized name.
    RenameTo { mode: TransferMode, to: PathBuf },
    /// Remove the existing destination first, then proceed.
    Overwrite { mode: TransferMode, to: PathBuf },
    Cancel,
}

impl TransferPlan {
    pub(crate) fn proceed(mode: TransferMode, to: PathBuf) -> Self {
        match mode {
            TransferMode::Copy => TransferPlan::Copy { to },
            TransferMode::Move => TransferPlan::Move { to },
        }
    }
}
