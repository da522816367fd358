//! Explorer session
//!
//! Ties the clipboard, the transfer engine and navigation together the way a
//! file manager window uses them, and reports what changed to an
//! [`EventSink`]. One session per window; nothing here is process-global.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use explorer_fs::{
    list_directory, BatchKind, BatchReport, ClipboardChange, ClipboardMode, ClipboardStore, ConflictResolver,
    EntryAction, EntryKind, EntryProperties, FileItem, Location, NavigationController, NavigationError,
    PinnedLocation, SearchEngine, SearchResult, TransferEngine, TransferError, TransferResult, TrashCapability,
};

use crate::pinned::pinned_locations;
use crate::settings::ExplorerSettings;

// ============================================================================
// COLLABORATORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerEvent {
    LocationChanged(Location),
    /// Paths whose cut/copy marking changed.
    ClipboardChanged(Vec<PathBuf>),
    BatchCompleted(BatchReport),
}

pub trait EventSink: Send {
    fn emit(&mut self, event: ExplorerEvent);
}

impl<F> EventSink for F
where
    F: FnMut(ExplorerEvent) + Send,
{
    fn emit(&mut self, event: ExplorerEvent) {
        self(event)
    }
}

/// Cloneable sink that keeps every event, for hosts that poll.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<ExplorerEvent>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<ExplorerEvent> {
        std::mem::take(&mut *self.0.lock())
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: ExplorerEvent) {
        self.0.lock().push(event);
    }
}

/// System text clipboard, used by "copy path".
pub trait TextClipboard: Send {
    fn set_text(&mut self, text: &str) -> bool;
}

/// Opens a file with whatever the host considers its handler.
pub trait Opener: Send {
    fn open(&self, path: &Path) -> std::io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        open::that(path)
    }
}

/// What activating an entry did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Navigated(Location),
    Opened(PathBuf),
}

// ============================================================================
// SESSION
// ============================================================================

pub struct ExplorerSession {
    settings: ExplorerSettings,
    navigation: NavigationController,
    clipboard: ClipboardStore,
    engine: TransferEngine,
    events: Box<dyn EventSink>,
    text_clipboard: Option<Box<dyn TextClipboard>>,
    opener: Box<dyn Opener>,
}

impl ExplorerSession {
    /// Builds a session from settings, pinning the user folders that exist.
    pub fn new(settings: ExplorerSettings) -> Self {
        let pinned = pinned_locations(&settings);
        Self::with_pinned(settings, pinned)
    }

    pub fn with_pinned(settings: ExplorerSettings, pinned: Vec<PinnedLocation>) -> Self {
        let engine = if settings.use_trash {
            TransferEngine::default()
        } else {
            TransferEngine::without_trash()
        };
        let navigation = NavigationController::new(settings.resolver(), SearchEngine::new(settings.search.clone()))
            .with_pinned(pinned);

        Self {
            settings,
            navigation,
            clipboard: ClipboardStore::new(),
            engine,
            events: Box::new(|_event: ExplorerEvent| {}),
            text_clipboard: None,
            opener: Box::new(SystemOpener),
        }
    }

    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Box::new(sink);
        self
    }

    pub fn with_text_clipboard(mut self, clipboard: impl TextClipboard + 'static) -> Self {
        self.text_clipboard = Some(Box::new(clipboard));
        self
    }

    pub fn with_opener(mut self, opener: impl Opener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    /// Replaces the trash capability. `None` makes every delete permanent.
    pub fn with_trash(mut self, trash: Option<Arc<dyn TrashCapability>>) -> Self {
        self.engine = TransferEngine::new(trash);
        self
    }

    pub fn settings(&self) -> &ExplorerSettings {
        &self.settings
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn clipboard(&self) -> &ClipboardStore {
        &self.clipboard
    }

    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    pub fn current(&self) -> &Location {
        self.navigation.current()
    }

    /// Renderer query for graying out cut entries.
    pub fn is_cut(&self, path: &Path) -> bool {
        self.clipboard.is_cut(path)
    }

    pub fn set_show_hidden(&mut self, show: bool) {
        self.settings.show_hidden = show;
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn navigate(&mut self, input: &str) -> Result<(), NavigationError> {
        self.track_location(|nav| nav.navigate(input).map(|_| ()))
    }

    pub fn navigate_to(&mut self, location: Location) -> Result<(), NavigationError> {
        self.track_location(|nav| nav.navigate_to(location).map(|_| ()))
    }

    pub fn go_back(&mut self) -> Result<bool, NavigationError> {
        self.track_location(NavigationController::go_back)
    }

    pub fn go_forward(&mut self) -> Result<bool, NavigationError> {
        self.track_location(NavigationController::go_forward)
    }

    pub fn go_up(&mut self) -> Result<(), NavigationError> {
        self.track_location(|nav| nav.go_up().map(|_| ()))
    }

    pub fn open_pinned(&mut self, index: usize) -> Result<(), NavigationError> {
        self.track_location(|nav| nav.open_pinned(index).map(|_| ()))
    }

    /// Searches below the current location.
    pub fn search(&mut self, query: &str) -> Result<&[SearchResult], NavigationError> {
        let scope = self.navigation.current().clone();
        self.navigation.search(query, &scope)
    }

    pub fn cancel_search(&mut self) {
        self.navigation.cancel_search();
    }

    pub fn activate_result(&mut self, index: usize) -> Result<SearchResult, NavigationError> {
        self.track_location(|nav| nav.activate_result(index))
    }

    /// Folders are entered, files are handed to the opener.
    pub fn activate(&mut self, path: &Path) -> TransferResult<Activation> {
        let location = Location::from_path(path);
        let kind = self.require(&location, EntryAction::Open)?;
        if kind.is_container() {
            self.navigate_to(location.clone())
                .map_err(|_| TransferError::NotFound(path.to_path_buf()))?;
            return Ok(Activation::Navigated(location));
        }

        self.opener.open(path).map_err(|e| TransferError::from_io(path, &e))?;
        tracing::info!("Opened {:?}", path);
        Ok(Activation::Opened(path.to_path_buf()))
    }

    /// Current folder's entries, read fresh from disk.
    pub fn list(&self) -> TransferResult<Vec<FileItem>> {
        list_directory(self.navigation.current(), &self.settings.listing_options())
    }

    fn track_location<T>(
        &mut self,
        f: impl FnOnce(&mut NavigationController) -> Result<T, NavigationError>,
    ) -> Result<T, NavigationError> {
        let before = self.navigation.current().clone();
        let result = f(&mut self.navigation)?;
        if *self.navigation.current() != before {
            let location = self.navigation.current().clone();
            self.events.emit(ExplorerEvent::LocationChanged(location));
        }
        Ok(result)
    }

    // ========================================================================
    // CLIPBOARD AND TRANSFERS
    // ========================================================================

    pub fn copy(&mut self, paths: &[PathBuf]) -> TransferResult<()> {
        self.fill_clipboard(paths, ClipboardMode::Copy)
    }

    pub fn cut(&mut self, paths: &[PathBuf]) -> TransferResult<()> {
        self.fill_clipboard(paths, ClipboardMode::Cut)
    }

    fn fill_clipboard(&mut self, paths: &[PathBuf], mode: ClipboardMode) -> TransferResult<()> {
        let action = match mode {
            ClipboardMode::Copy => EntryAction::Copy,
            ClipboardMode::Cut => EntryAction::Cut,
        };
        for path in paths {
            self.require(&Location::from_path(path), action)?;
        }

        let paths = paths.iter().map(|p| explorer_fs::normalize(p));
        let change = match mode {
            ClipboardMode::Copy => self.clipboard.set_copy(paths),
            ClipboardMode::Cut => self.clipboard.set_cut(paths),
        };
        self.emit_clipboard(change);
        Ok(())
    }

    pub fn clear_clipboard(&mut self) {
        let change = self.clipboard.clear();
        self.emit_clipboard(change);
    }

    /// Pastes the clipboard into `destination` (the current location when
    /// `None`). The clipboard is emptied when every item succeeded; otherwise
    /// it keeps only the items that failed.
    pub fn paste(
        &mut self,
        destination: Option<&Location>,
        resolver: &mut dyn ConflictResolver,
    ) -> TransferResult<BatchReport> {
        let destination = destination.unwrap_or(self.navigation.current()).clone();
        let Some(mode) = self.clipboard.mode() else {
            return Ok(BatchReport::new(BatchKind::Copy, Vec::new()));
        };
        self.require(&destination, EntryAction::Paste)?;

        let sources = self.clipboard.entries().to_vec();
        let (kind, items) = match mode {
            ClipboardMode::Copy => (BatchKind::Copy, self.engine.copy_items(&sources, &destination, resolver)),
            ClipboardMode::Cut => (BatchKind::Move, self.engine.move_items(&sources, &destination, resolver)),
        };
        let report = BatchReport::new(kind, items);

        let change = if report.all_succeeded() {
            self.clipboard.clear()
        } else {
            let done: Vec<&Path> = report
                .items
                .iter()
                .filter(|i| i.outcome.is_success())
                .map(|i| i.source.as_path())
                .collect();
            self.clipboard.remove(done)
        };
        self.emit_clipboard(change);
        self.events.emit(ExplorerEvent::BatchCompleted(report.clone()));
        Ok(report)
    }

    /// Trash-first delete. Each target gets its own outcome: a volume root
    /// is reported as failed while the other targets are still deleted.
    pub fn delete(&mut self, targets: &[PathBuf]) -> TransferResult<BatchReport> {
        let report = BatchReport::new(BatchKind::Delete, self.engine.delete_items(targets));
        let deleted: Vec<PathBuf> = report
            .items
            .iter()
            .filter(|i| i.outcome.is_success())
            .map(|i| explorer_fs::normalize(&i.source))
            .collect();
        let change = self.clipboard.remove(deleted.iter().map(PathBuf::as_path));
        self.emit_clipboard(change);
        self.events.emit(ExplorerEvent::BatchCompleted(report.clone()));
        Ok(report)
    }

    pub fn rename(&mut self, target: &Path, new_name: &str) -> TransferResult<PathBuf> {
        self.require(&Location::from_path(target), EntryAction::Rename)?;
        let renamed = self.engine.rename(target, new_name)?;
        if renamed.as_path() != target {
            let change = self.clipboard.remove([explorer_fs::normalize(target).as_path()]);
            self.emit_clipboard(change);
        }
        Ok(renamed)
    }

    /// Creates a file in the current location.
    pub fn create_file(&mut self, name: &str) -> TransferResult<PathBuf> {
        let dir = self.navigation.current().clone();
        self.require(&dir, EntryAction::CreateFile)?;
        self.engine.create_file(&dir, name)
    }

    /// Creates a folder in the current location.
    pub fn create_directory(&mut self, name: &str) -> TransferResult<PathBuf> {
        let dir = self.navigation.current().clone();
        self.require(&dir, EntryAction::CreateDirectory)?;
        self.engine.create_directory(&dir, name)
    }

    /// Puts the display path on the text clipboard, if one is attached, and
    /// returns it.
    pub fn copy_path(&mut self, location: &Location) -> TransferResult<String> {
        self.require(location, EntryAction::CopyPath)?;
        let text = location.to_string();
        if let Some(clipboard) = self.text_clipboard.as_mut() {
            if !clipboard.set_text(&text) {
                tracing::warn!("Text clipboard refused {:?}", text);
            }
        }
        Ok(text)
    }

    pub fn properties(&self, location: &Location) -> TransferResult<EntryProperties> {
        self.require(location, EntryAction::Properties)?;
        EntryProperties::read(location)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn kind_for(&self, location: &Location) -> TransferResult<EntryKind> {
        self.navigation.resolver().kind_of(location)
    }

    fn require(&self, location: &Location, action: EntryAction) -> TransferResult<EntryKind> {
        let kind = self.kind_for(location)?;
        let path = location.path().unwrap_or(Path::new(""));
        Self::check_action(path, kind, action)?;
        Ok(kind)
    }

    fn check_action(path: &Path, kind: EntryKind, action: EntryAction) -> TransferResult<()> {
        if kind.allows(action) {
            Ok(())
        } else {
            Err(TransferError::invalid_target(path, format!("{:?} is not available for {:?}", action, kind)))
        }
    }

    fn emit_clipboard(&mut self, change: ClipboardChange) {
        if !change.is_empty() {
            self.events
                .emit(ExplorerEvent::ClipboardChanged(change.paths.into_iter().collect()));
        }
    }
}
