//! Transfer Engine
//!
//! Copy, move, delete, create and rename. Batch operations never abort on a
//! single failure: every source item gets its own [`Outcome`] and the batch
//! carries on with the next one.

pub mod conflict;
pub mod naming;
pub mod trash;
mod tree;
pub mod worker;

pub use conflict::{Always, Conflict, ConflictChoice, ConflictResolver, TransferMode, TransferPlan};
pub use naming::{available_name, numbered_name, unique_name, validate_name, UniqueNames, FORBIDDEN_CHARS};
pub use trash::{system_trash, TrashCapability};
pub use worker::{BatchHandle, TransferJob, TransferWorker};

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{TransferError, TransferResult};
use crate::location::{entry_kind, is_volume_root, normalize, EntryKind, Location};
use naming::occupied;

// ============================================================================
// OUTCOMES
// ============================================================================

/// Why an item needed no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoOp {
    /// Source and destination are the same path.
    SameLocation,
    /// Delete target had already disappeared.
    AlreadyGone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Copied(PathBuf),
    Moved(PathBuf),
    Trashed,
    /// Permanently removed.
    Deleted,
    Unchanged(NoOp),
    /// The user declined this item, or the batch was cancelled before it.
    Cancelled,
    Failed(TransferError),
}

impl Outcome {
    /// Everything except [`Outcome::Failed`] counts as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    pub fn error(&self) -> Option<&TransferError> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Where the item ended up, for copies and moves.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Outcome::Copied(path) | Outcome::Moved(path) => Some(path),
            _ => None,
        }
    }

    fn from_result(result: TransferResult<Outcome>) -> Self {
        result.unwrap_or_else(Outcome::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub source: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Copy,
    Move,
    Delete,
}

impl BatchKind {
    pub fn past_tense(self) -> &'static str {
        match self {
            BatchKind::Copy => TransferMode::Copy.past_tense(),
            BatchKind::Move => TransferMode::Move.past_tense(),
            BatchKind::Delete => "deleted",
        }
    }
}

impl From<TransferMode> for BatchKind {
    fn from(mode: TransferMode) -> Self {
        match mode {
            TransferMode::Copy => BatchKind::Copy,
            TransferMode::Move => BatchKind::Move,
        }
    }
}

/// A finished batch, in source-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub kind: BatchKind,
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn new(kind: BatchKind, items: Vec<ItemOutcome>) -> Self {
        Self { kind, items }
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &TransferError)> {
        self.items
            .iter()
            .filter_map(|i| i.outcome.error().map(|e| (i.source.as_path(), e)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.items.iter().all(|i| i.outcome.is_success())
    }
}

impl fmt::Display for BatchReport {
    /// "3 of 5 items moved; 2 failed: a.txt (permission denied), b (not found)"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.items.len();
        let noun = if total == 1 { "item" } else { "items" };
        write!(f, "{} of {} {} {}", self.succeeded(), total, noun, self.kind.past_tense())?;

        let failures: Vec<String> = self
            .failures()
            .map(|(path, err)| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("{} ({})", name, err.label())
            })
            .collect();
        if !failures.is_empty() {
            write!(f, "; {} failed: {}", failures.len(), failures.join(", "))?;
        }
        Ok(())
    }
}

// ============================================================================
// TRANSFER ENGINE
// ============================================================================

/// Executes transfers against the live filesystem. Holds no state besides
/// the trash capability, so clones are cheap and can move to a worker.
#[derive(Clone)]
pub struct TransferEngine {
    trash: Option<Arc<dyn TrashCapability>>,
}

impl fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferEngine")
            .field("trash", &self.trash.is_some())
            .finish()
    }
}

impl Default for TransferEngine {
    fn default() -> Self {
        Self::new(system_trash())
    }
}

impl TransferEngine {
    pub fn new(trash: Option<Arc<dyn TrashCapability>>) -> Self {
        Self { trash }
    }

    /// Every delete is permanent.
    pub fn without_trash() -> Self {
        Self::new(None)
    }

    pub fn has_trash(&self) -> bool {
        self.trash.is_some()
    }

    pub fn copy_items(
        &self,
        sources: &[PathBuf],
        destination: &Location,
        resolver: &mut dyn ConflictResolver,
    ) -> Vec<ItemOutcome> {
        self.run_transfer(TransferMode::Copy, sources, destination, resolver, &AtomicBool::new(false), &mut |_| {})
    }

    /// Cut-paste. Renames where possible, otherwise copies and then removes
    /// the source once the copy fully succeeded.
    pub fn move_items(
        &self,
        sources: &[PathBuf],
        destination: &Location,
        resolver: &mut dyn ConflictResolver,
    ) -> Vec<ItemOutcome> {
        self.run_transfer(TransferMode::Move, sources, destination, resolver, &AtomicBool::new(false), &mut |_| {})
    }

    /// Trash-first delete of every target.
    pub fn delete_items(&self, targets: &[PathBuf]) -> Vec<ItemOutcome> {
        self.run_delete(targets, &AtomicBool::new(false), &mut |_| {})
    }

    /// Runs a copy or move batch. `cancel` is checked between items only;
    /// once set, every remaining item is reported as cancelled. `on_item`
    /// sees each outcome as soon as it is known, in source order.
    pub fn run_transfer(
        &self,
        mode: TransferMode,
        sources: &[PathBuf],
        destination: &Location,
        resolver: &mut dyn ConflictResolver,
        cancel: &AtomicBool,
        on_item: &mut dyn FnMut(&ItemOutcome),
    ) -> Vec<ItemOutcome> {
        let destination_dir = Self::destination_dir(destination);
        let mut outcomes = Vec::with_capacity(sources.len());

        for source in sources {
            let outcome = if cancel.load(Ordering::SeqCst) {
                Outcome::Cancelled
            } else {
                match &destination_dir {
                    Err(err) => Outcome::Failed(err.clone()),
                    Ok(dir) => match self.plan_item(mode, source, dir, resolver) {
                        Ok(plan) => self.execute_plan(source, plan),
                        Err(err) => Outcome::Failed(err),
                    },
                }
            };

            match &outcome {
                Outcome::Failed(err) => tracing::error!("Failed to transfer {:?}: {}", source, err),
                other => tracing::debug!("Transfer {:?}: {:?}", source, other),
            }

            let item = ItemOutcome {
                source: source.clone(),
                outcome,
            };
            on_item(&item);
            outcomes.push(item);
        }

        let report = BatchReport::new(mode.into(), outcomes);
        tracing::info!("{} into {}", report, destination);
        report.items
    }

    /// Runs a delete batch with the same cancellation and streaming rules
    /// as [`Self::run_transfer`].
    pub fn run_delete(
        &self,
        targets: &[PathBuf],
        cancel: &AtomicBool,
        on_item: &mut dyn FnMut(&ItemOutcome),
    ) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let outcome = if cancel.load(Ordering::SeqCst) {
                Outcome::Cancelled
            } else {
                self.delete_one(target)
            };
            if let Outcome::Failed(err) = &outcome {
                tracing::error!("Failed to delete {:?}: {}", target, err);
            }
            let item = ItemOutcome {
                source: target.clone(),
                outcome,
            };
            on_item(&item);
            outcomes.push(item);
        }

        let report = BatchReport::new(BatchKind::Delete, outcomes);
        tracing::info!("{}", report);
        report.items
    }

    fn destination_dir(destination: &Location) -> TransferResult<PathBuf> {
        let Location::Path(dir) = destination else {
            return Err(TransferError::invalid_target(
                Path::new(""),
                "paste into a volume, not the collection root",
            ));
        };
        match entry_kind(dir).map_err(|e| TransferError::from_io(dir, &e))? {
            EntryKind::Directory | EntryKind::VolumeRoot => Ok(dir.clone()),
            EntryKind::File | EntryKind::CollectionRoot => {
                Err(TransferError::invalid_target(dir, "destination is not a folder"))
            }
        }
    }

    /// Decides what to do with one source item. Asks `resolver` only when the
    /// destination name is taken.
    pub fn plan_item(
        &self,
        mode: TransferMode,
        source: &Path,
        destination_dir: &Path,
        resolver: &mut dyn ConflictResolver,
    ) -> TransferResult<TransferPlan> {
        let metadata = fs::metadata(source)
            .or_else(|_| fs::symlink_metadata(source))
            .map_err(|e| TransferError::from_io(source, &e))?;
        let source_is_dir = metadata.is_dir();

        let name = source
            .file_name()
            .ok_or_else(|| TransferError::invalid_target(source, "volume roots cannot be transferred"))?;
        let target = destination_dir.join(name);

        let same_location = normalize(&target) == normalize(source);
        if same_location && mode == TransferMode::Move {
            return Ok(TransferPlan::SkipIdentical);
        }
        if source_is_dir && normalize(destination_dir).starts_with(normalize(source)) {
            return Err(TransferError::invalid_target(
                destination_dir,
                "cannot place a folder inside itself",
            ));
        }

        if !occupied(&target) {
            return Ok(TransferPlan::proceed(mode, target));
        }

        let conflict = Conflict {
            source: source.to_path_buf(),
            destination: target.clone(),
            source_is_dir,
            destination_is_dir: target.is_dir(),
        };
        let choice = resolver.resolve_conflict(&conflict);
        tracing::debug!("{} -> {:?}", conflict.describe(), choice);

        Ok(match choice {
            // Overwriting an item with itself would destroy it.
            ConflictChoice::Overwrite if same_location => TransferPlan::SkipIdentical,
            ConflictChoice::Overwrite if normalize(source).starts_with(normalize(&target)) => {
                return Err(TransferError::invalid_target(
                    &target,
                    "destination contains the source",
                ));
            }
            ConflictChoice::Overwrite => TransferPlan::Overwrite { mode, to: target },
            ConflictChoice::Rename => TransferPlan::RenameTo {
                mode,
                to: unique_name(destination_dir, &name.to_string_lossy(), source_is_dir),
            },
            ConflictChoice::Cancel => TransferPlan::Cancel,
        })
    }

    fn execute_plan(&self, source: &Path, plan: TransferPlan) -> Outcome {
        match plan {
            TransferPlan::Copy { to } => self.proceed(TransferMode::Copy, source, to),
            TransferPlan::Move { to } => self.proceed(TransferMode::Move, source, to),
            TransferPlan::RenameTo { mode, to } => self.proceed(mode, source, to),
            TransferPlan::Overwrite { mode, to } => match self.discard(&to) {
                Ok(_) => self.proceed(mode, source, to),
                Err(err) => Outcome::Failed(err),
            },
            TransferPlan::SkipIdentical => Outcome::Unchanged(NoOp::SameLocation),
            TransferPlan::Cancel => Outcome::Cancelled,
        }
    }

    fn proceed(&self, mode: TransferMode, source: &Path, to: PathBuf) -> Outcome {
        let result = match mode {
            TransferMode::Copy => tree::copy_entry(source, &to).map(|_| Outcome::Copied(to)),
            TransferMode::Move => Self::move_entry(source, to),
        };
        Outcome::from_result(result)
    }

    fn move_entry(source: &Path, to: PathBuf) -> TransferResult<Outcome> {
        match fs::rename(source, &to) {
            Ok(()) => Ok(Outcome::Moved(to)),
            Err(e) if tree::is_cross_device(&e) => Self::move_across_volumes(source, to),
            Err(e) => Err(TransferError::from_io(source, &e)),
        }
    }

    /// Copy then remove. The source is only removed once the whole copy
    /// succeeded; a failed copy leaves it in place.
    fn move_across_volumes(source: &Path, to: PathBuf) -> TransferResult<Outcome> {
        tracing::debug!("Cross-volume move of {:?}, copying then removing", source);
        tree::copy_entry(source, &to)?;
        tree::remove_permanently(source).map_err(|e| TransferError::from_io(source, &e))?;
        Ok(Outcome::Moved(to))
    }

    /// Trash-first removal of one entry.
    pub fn delete_one(&self, target: &Path) -> Outcome {
        if !occupied(target) {
            return Outcome::Unchanged(NoOp::AlreadyGone);
        }
        if is_volume_root(target) {
            return Outcome::Failed(TransferError::invalid_target(target, "volume roots cannot be deleted"));
        }
        Outcome::from_result(self.discard(target))
    }

    /// Hands `path` to the trash, falling back to permanent removal when the
    /// capability is missing or refuses.
    fn discard(&self, path: &Path) -> TransferResult<Outcome> {
        match self.try_trash(path) {
            Ok(()) => Ok(Outcome::Trashed),
            Err(_unavailable) => match tree::remove_permanently(path) {
                Ok(()) => Ok(Outcome::Deleted),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Outcome::Unchanged(NoOp::AlreadyGone)),
                Err(e) => Err(TransferError::from_io(path, &e)),
            },
        }
    }

    fn try_trash(&self, path: &Path) -> TransferResult<()> {
        match &self.trash {
            Some(trash) if trash.move_to_trash(path) => Ok(()),
            Some(_) => {
                tracing::warn!("Trash refused {:?}, deleting permanently", path);
                Err(TransferError::CapabilityUnavailable)
            }
            None => Err(TransferError::CapabilityUnavailable),
        }
    }

    // ========================================================================
    // CREATE / RENAME
    // ========================================================================

    /// Creates an empty file named `name` (or the first free `name_N`) in `dir`.
    pub fn create_file(&self, dir: &Location, name: &str) -> TransferResult<PathBuf> {
        self.create_entry(dir, name, false, |path| {
            fs::OpenOptions::new().write(true).create_new(true).open(path).map(drop)
        })
    }

    /// Creates a folder named `name` (or the first free `name_N`) in `dir`.
    pub fn create_directory(&self, dir: &Location, name: &str) -> TransferResult<PathBuf> {
        self.create_entry(dir, name, true, |path| fs::create_dir(path))
    }

    fn create_entry(
        &self,
        dir: &Location,
        name: &str,
        is_dir: bool,
        create: impl Fn(&Path) -> io::Result<()>,
    ) -> TransferResult<PathBuf> {
        validate_name(name)?;
        let dir = Self::destination_dir(dir)?;

        let candidates = std::iter::once(dir.join(name)).chain(UniqueNames::new(&dir, name, is_dir));
        for candidate in candidates {
            match create(&candidate) {
                Ok(()) => {
                    tracing::info!("Created {:?}", candidate);
                    return Ok(candidate);
                }
                // Lost a race or the name was taken: try the next number.
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(TransferError::from_io(&candidate, &e)),
            }
        }
        Err(TransferError::AlreadyExists(dir.join(name)))
    }

    /// Renames `target` in place. Renaming to the current name is a no-op.
    pub fn rename(&self, target: &Path, new_name: &str) -> TransferResult<PathBuf> {
        validate_name(new_name)?;
        fs::symlink_metadata(target).map_err(|e| TransferError::from_io(target, &e))?;

        let (Some(parent), Some(current)) = (target.parent(), target.file_name()) else {
            return Err(TransferError::invalid_target(target, "volume roots cannot be renamed"));
        };
        if current == new_name {
            return Ok(target.to_path_buf());
        }

        let new_path = parent.join(new_name);
        if occupied(&new_path) && !Self::same_entry(target, &new_path) {
            return Err(TransferError::AlreadyExists(new_path));
        }

        fs::rename(target, &new_path).map_err(|e| TransferError::from_io(target, &e))?;
        tracing::info!("Renamed {:?} to {:?}", target, new_path);
        Ok(new_path)
    }

    /// Case-only renames on case-insensitive filesystems see the target as
    /// already existing.
    fn same_entry(a: &Path, b: &Path) -> bool {
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
